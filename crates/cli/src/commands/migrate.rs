//! Database migration command.
//!
//! Migrations live in `crates/engine/migrations/` and are embedded in the
//! engine binary, which also applies them on startup. This command exists
//! for deploys that migrate before rolling out.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - SQLite connection string (default: `sqlite://mona.db`)

use super::{CommandError, connect};

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    pool.close().await;

    tracing::info!("Migrations complete!");
    Ok(())
}
