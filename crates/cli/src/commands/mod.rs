//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod snapshot;

use sqlx::SqlitePool;

use mona_engine::config::{ConfigError, EngineConfig};
use mona_engine::db;

/// Errors shared by every command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] mona_engine::db::RepositoryError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to `DATABASE_URL` and bring the schema up to date.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database cannot be
/// opened, or a migration fails.
pub async fn connect() -> Result<SqlitePool, CommandError> {
    let config = EngineConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    db::migrate(&pool).await?;
    Ok(pool)
}
