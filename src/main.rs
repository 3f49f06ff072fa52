use std::path::PathBuf;

use clap::Parser;
use matchday::{
    config::{Config, create_app},
    state::{AppState, make_pool, run_migrations},
    store::sqlite::SqliteStore,
    sync::Mirror,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[clap(about = "Serves the league tracker.")]
struct Args {
    /// A TOML file with any of `database_url`, `bind`, `secret_key` and
    /// `log_level`. Environment variables take precedence over it.
    #[clap(long, env = "MATCHDAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!(database = %config.database_url, "starting");

    let pool = make_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let store = SqliteStore::new(pool);
    let (mirror, league) = Mirror::spawn(store.clone());

    let app = create_app(AppState {
        store,
        league,
        key: config.key(),
    });

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {e}");
            }
        })
        .await?;

    mirror.shutdown().await;
    Ok(())
}
