//! PostgreSQL pool for the WorkTrack store.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use worktrack_core::config::DatabaseConfig;
use worktrack_core::error::{AppError, ErrorKind};

/// Name reported to PostgreSQL in `pg_stat_activity`.
const APPLICATION_NAME: &str = "worktrack";

/// Connection pool backing [`crate::PgStore`].
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool sized by `database.*` settings. A malformed URL or
    /// inverted pool bounds are configuration errors.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        if config.min_connections > config.max_connections {
            return Err(AppError::configuration(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                config.min_connections, config.max_connections
            )));
        }

        let options = connect_options(&config.url)?;
        info!(
            host = %options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or("<default>"),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Opening WorkTrack store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Could not reach the WorkTrack database",
                    e,
                )
            })?;

        info!(size = pool.size(), "WorkTrack store pool ready");
        Ok(Self { pool })
    }

    /// Borrow the sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Hand the sqlx pool to the repositories.
    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}

/// Parse `database.url` and tag the session with the application name.
fn connect_options(url: &str) -> Result<PgConnectOptions, AppError> {
    if url.trim().is_empty() {
        return Err(AppError::configuration("database.url is empty"));
    }
    let options: PgConnectOptions = url.parse().map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid PostgreSQL URL",
            e,
        )
    })?;
    Ok(options.application_name(APPLICATION_NAME))
}
