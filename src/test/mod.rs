//! Shared test fixtures.

use std::time::Duration;

use axum::Router;
use axum_extra::extract::cookie::Key;
use tokio::sync::watch;

use crate::{
    config::create_app,
    state::{AppState, make_pool, run_migrations},
    store::sqlite::SqliteStore,
    sync::{LeagueData, Mirror},
};


/// A store backed by a fresh, fully migrated in-memory database.
pub fn memory_store() -> SqliteStore {
    let pool = make_pool(":memory:").unwrap();
    run_migrations(&pool).unwrap();
    SqliteStore::new(pool)
}

/// The whole server, wired up the way the binary does it.
pub struct TestApp {
    pub app: Router,
    pub store: SqliteStore,
    pub league: watch::Receiver<LeagueData>,
    _mirror: Mirror,
}

impl TestApp {
    /// Must be called from within a tokio runtime, as it starts the mirror.
    pub fn new() -> Self {
        let store = memory_store();
        let (mirror, league) = Mirror::spawn(store.clone());
        let app = create_app(AppState {
            store: store.clone(),
            league: league.clone(),
            key: Key::from(&[7u8; 64][..]),
        });

        Self {
            app,
            store,
            league,
            _mirror: mirror,
        }
    }

    /// Waits (up to a few seconds) until the mirror satisfies `f`.
    pub async fn converged(
        &mut self,
        f: impl FnMut(&LeagueData) -> bool,
    ) -> LeagueData {
        tokio::time::timeout(Duration::from_secs(5), self.league.wait_for(f))
            .await
            .expect("mirror did not converge")
            .expect("mirror stopped")
            .clone()
    }
}
