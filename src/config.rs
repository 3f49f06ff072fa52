//! Server configuration, and the router built from it.

use std::{net::SocketAddr, path::Path, str::FromStr};

use axum::{
    Router,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::{
    auth::login::{do_login, do_logout, login_page},
    state::AppState,
    views::{
        feed::sync_ws,
        home_page,
        matches::{
            do_add_match, do_delete_match, do_update_score, matches_page,
        },
        players::{do_add_player, do_delete_player, players_page},
        table::{table_csv, table_page},
        teams::{do_add_team, do_delete_team, teams_page},
    },
};

/// The cookie key must be at least this long.
pub const MIN_SECRET_KEY_LEN: usize = 64;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid bind address {0:?}")]
    InvalidBind(String),
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
    #[error(
        "secret_key is {0} bytes long, but must be at least {MIN_SECRET_KEY_LEN}"
    )]
    SecretKeyTooShort(usize),
}

/// The config file. Every key is optional.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database_url: Option<String>,
    bind: Option<String>,
    secret_key: Option<String>,
    log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind: SocketAddr,
    /// When unset a random key is generated, and sessions do not survive a
    /// restart.
    pub secret_key: Option<String>,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: ":memory:".to_string(),
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            secret_key: None,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Reads the config file (if any), then applies the `DATABASE_URL`,
    /// `BIND_ADDRESS`, `SECRET_KEY` and `LOG_LEVEL` environment variables on
    /// top of it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
            None => FileConfig::default(),
        };

        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    pub fn from_toml(
        text: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_sources(toml::from_str(text)?, env)
    }

    fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(url) = env("DATABASE_URL").or(file.database_url) {
            config.database_url = url;
        }
        if let Some(bind) = env("BIND_ADDRESS").or(file.bind) {
            config.bind = SocketAddr::from_str(&bind)
                .map_err(|_| ConfigError::InvalidBind(bind))?;
        }
        if let Some(level) = env("LOG_LEVEL").or(file.log_level) {
            config.log_level = Level::from_str(&level)
                .map_err(|_| ConfigError::InvalidLogLevel(level))?;
        }
        if let Some(key) = env("SECRET_KEY").or(file.secret_key) {
            if key.len() < MIN_SECRET_KEY_LEN {
                return Err(ConfigError::SecretKeyTooShort(key.len()));
            }
            config.secret_key = Some(key);
        }

        Ok(config)
    }

    /// The key used to encrypt the session cookie.
    pub fn key(&self) -> Key {
        match &self.secret_key {
            Some(secret) => Key::from(secret.as_bytes()),
            None => {
                tracing::warn!(
                    "no secret_key configured, admin sessions will not survive a restart"
                );
                Key::generate()
            }
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_page).post(do_login))
        .route("/logout", post(do_logout))
        .route("/teams", get(teams_page).post(do_add_team))
        .route("/teams/:id/delete", post(do_delete_team))
        .route("/players", get(players_page).post(do_add_player))
        .route("/players/:id/delete", post(do_delete_player))
        .route("/matches", get(matches_page).post(do_add_match))
        .route("/matches/:id/score", post(do_update_score))
        .route("/matches/:id/delete", post(do_delete_match))
        .route("/table", get(table_page))
        .route("/table.csv", get(table_csv))
        .route("/sync/:collection", get(sync_ws))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let config = Config::from_toml("", no_env).unwrap();
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn environment_beats_file() {
        let config = Config::from_toml(
            r#"
            database_url = "league.db"
            bind = "0.0.0.0:3000"
            log_level = "debug"
            "#,
            |name| (name == "DATABASE_URL").then(|| "other.db".to_string()),
        )
        .unwrap();

        assert_eq!(config.database_url, "other.db");
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn short_secret_is_rejected() {
        let err =
            Config::from_toml(r#"secret_key = "too short""#, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::SecretKeyTooShort(9)));

        let config =
            Config::from_toml(&format!("secret_key = \"{}\"", "k".repeat(64)), no_env)
                .unwrap();
        // doesn't panic
        let _ = config.key();
    }

    #[test]
    fn bad_values() {
        assert!(matches!(
            Config::from_toml(r#"bind = "localhost""#, no_env),
            Err(ConfigError::InvalidBind(_))
        ));
        assert!(matches!(
            Config::from_toml(r#"log_level = "loud""#, no_env),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            Config::from_toml(r#"colour = "red""#, no_env),
            Err(ConfigError::Toml(_))
        ));
    }
}
