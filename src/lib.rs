//! Matchday: a small league tracker.
//!
//! Teams, players and matches live in a [`store::Store`]. Every change is
//! broadcast to subscribers, which reload the affected collection in full;
//! the server keeps a [`sync::LeagueData`] mirror of all three collections and
//! renders pages (including the standings table) from it.

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod auth;
pub mod config;
pub mod league;
pub mod msg;
pub mod schema;
pub mod state;
pub mod store;
pub mod sync;
pub mod template;
pub mod upload;
pub mod util_resp;
pub mod validation;
pub mod views;
pub mod widgets;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
