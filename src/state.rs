use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError},
};
use diesel_migrations::MigrationHarness;
use tokio::sync::watch;

use crate::{
    MIGRATIONS,
    store::{StoreError, sqlite::SqliteStore},
    sync::LeagueData,
};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas. Several pooled connections write to the same file,
/// so writers wait on each other instead of failing with `SQLITE_BUSY`.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionOptions
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool. Every connection to `:memory:` opens a fresh
/// database, so an in-memory pool holds exactly one connection.
pub fn make_pool(db_url: &str) -> Result<DbPool, PoolError> {
    Pool::builder()
        .max_size(if db_url == ":memory:" { 1 } else { 10 })
        .connection_customizer(Box::new(ConnectionOptions))
        .build(ConnectionManager::<SqliteConnection>::new(db_url))
}

pub fn run_migrations(pool: &DbPool) -> Result<(), StoreError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    tracing::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
    pub league: watch::Receiver<LeagueData>,
    pub key: Key,
}

impl AppState {
    /// A copy of the most recently mirrored league data.
    pub fn league(&self) -> LeagueData {
        self.league.borrow().clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
