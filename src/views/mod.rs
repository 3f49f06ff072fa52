//! The HTTP handlers: one page per [`View`](crate::template::View), the admin
//! mutations behind them, and the websocket change feed.
//!
//! Pages are rendered from the mirrored [`LeagueData`] rather than from the
//! store. A mutation only redirects once the mirror shows its write (see
//! [`caught_up`]), and every page listens on the change feed for the writes
//! made by anybody else.

use std::time::Duration;

use axum::extract::State;
use hypertext::prelude::*;
use itertools::Itertools;
use tokio::task::spawn_blocking;

use crate::{
    auth::Admin,
    state::AppState,
    store::StoreError,
    sync::LeagueData,
    template::{Page, View},
    util_resp::{StandardResponse, success},
    views::table::ranked,
    widgets::alert::InfoAlert,
};

pub mod feed;
pub mod matches;
pub mod players;
pub mod table;
pub mod teams;

/// Runs a store command off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Background(e.to_string()))?
}

const CATCH_UP_TIMEOUT: Duration = Duration::from_secs(2);

/// Waits until the mirror satisfies `f`, which should test for a write the
/// caller has just made. The page a mutation redirects to is rendered from the
/// mirror, and its change feed starts from whatever the store holds by then,
/// so a redirect issued before the mirror catches up shows the old data with
/// nothing left to trigger a reload.
///
/// Gives up (with a warning) after [`CATCH_UP_TIMEOUT`].
pub(crate) async fn caught_up(
    state: &AppState,
    f: impl FnMut(&LeagueData) -> bool,
) {
    let mut league = state.league.clone();
    let waited = tokio::time::timeout(CATCH_UP_TIMEOUT, league.wait_for(f))
        .await
        .map(|seen| seen.map(drop));

    match waited {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::warn!("mirror stopped before showing the write"),
        Err(_) => tracing::warn!(
            "mirror did not show the write within {CATCH_UP_TIMEOUT:?}"
        ),
    }
}

pub async fn home_page(
    State(state): State<AppState>,
    admin: Option<Admin>,
) -> StandardResponse {
    let league = state.league();
    let standings = league.standings();
    let rows = ranked(&standings);
    let fixtures = league
        .matches
        .iter()
        .sorted_by_key(|m| m.date)
        .collect::<Vec<_>>();
    let league = &league;

    success(
        Page::new()
            .admin(&admin)
            .active_nav(View::Home)
            .body(maud! {
                h1 class="mb-4" { "Matchday" }
                div class="row g-3 mb-4" {
                    div class="col-md-4" {
                        div class="card text-center" {
                            div class="card-body" {
                                h2 class="card-title" { (league.teams.len()) }
                                a href=(View::Teams.path()) { "teams" }
                            }
                        }
                    }
                    div class="col-md-4" {
                        div class="card text-center" {
                            div class="card-body" {
                                h2 class="card-title" { (league.players.len()) }
                                a href=(View::Players.path()) { "players" }
                            }
                        }
                    }
                    div class="col-md-4" {
                        div class="card text-center" {
                            div class="card-body" {
                                h2 class="card-title" { (league.matches.len()) }
                                a href=(View::Matches.path()) { "matches" }
                            }
                        }
                    }
                }
                div class="row g-4" {
                    div class="col-md-6" {
                        h4 { "Fixtures" }
                        @if fixtures.is_empty() {
                            InfoAlert msg="No matches yet.";
                        }
                        ul class="list-group" {
                            @for m in &fixtures {
                                li class="list-group-item d-flex justify-content-between align-items-center" {
                                    span {
                                        (league.team_name(&m.home_team_id)) " v " (league.team_name(&m.away_team_id))
                                        small class="text-muted d-block" { (m.date.format("%a %e %b %Y").to_string()) }
                                    }
                                    @if let Some(score) = &m.score {
                                        strong { (score.to_string()) }
                                    } @else {
                                        span class="text-muted" { "no result" }
                                    }
                                }
                            }
                        }
                    }
                    div class="col-md-6" {
                        h4 { "League table" }
                        @if rows.is_empty() {
                            InfoAlert msg="No teams yet.";
                        } @else {
                            table class="table table-sm" {
                                thead {
                                    tr {
                                        th scope="col" { "#" }
                                        th scope="col" { "Team" }
                                        th scope="col" class="text-end" { "Pts" }
                                        th scope="col" class="text-end" { "GF" }
                                        th scope="col" class="text-end" { "GA" }
                                        th scope="col" class="text-end" { "GD" }
                                    }
                                }
                                tbody {
                                    @for (rank, row) in &rows {
                                        tr {
                                            th scope="row" { (rank) }
                                            td { (row.name) }
                                            td class="text-end fw-bold" { (row.points) }
                                            td class="text-end" { (row.goals_for) }
                                            td class="text-end" { (row.goals_against) }
                                            td class="text-end" { (format!("{:+}", row.goal_difference())) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
