//! Print the business snapshot for a tenant.

use mona_core::TenantId;
use mona_engine::intelligence::build_snapshot;

use super::{CommandError, connect};

/// Build and print a tenant's snapshot.
///
/// # Errors
///
/// Returns an error if the tenant id is invalid or the database cannot be
/// opened. Snapshot failures print the fallback text instead.
pub async fn print(user_id: &str) -> Result<(), CommandError> {
    let tenant =
        TenantId::parse(user_id).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let pool = connect().await?;

    let snapshot = build_snapshot(&pool, Some(&tenant)).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{snapshot}");
    }

    pool.close().await;
    Ok(())
}
