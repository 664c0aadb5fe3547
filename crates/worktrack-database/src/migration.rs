//! Schema migrations embedded from `migrations/`.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use worktrack_core::error::{AppError, ErrorKind};

/// The WorkTrack schema, compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Bring the schema up to the newest embedded version.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let target = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    info!(
        embedded = MIGRATOR.iter().count(),
        target_version = target,
        "Applying WorkTrack schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("WorkTrack schema migration failed: {e}"),
            e,
        )
    })?;

    info!(version = target, "WorkTrack schema is current");
    Ok(())
}
