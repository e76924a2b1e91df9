//! Database operations for connected platform stores.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use mona_core::{StoreId, TenantId};

use super::RepositoryError;
use crate::models::Store;

const COLUMNS: &str =
    "id, user_id, name, platform, store_url, access_token, is_active, last_sync, created_at";

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    user_id: Option<TenantId>,
    name: String,
    platform: String,
    store_url: String,
    access_token: Option<String>,
    is_active: bool,
    last_sync: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            platform: row.platform,
            store_url: row.store_url,
            access_token: row.access_token,
            is_active: row.is_active,
            last_sync: row.last_sync,
            created_at: row.created_at,
        }
    }
}

/// Repository for connected stores.
pub struct StoreRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a store, or refresh the token of the one already at `store_url`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    #[instrument(skip(self, access_token), fields(user_id = ?tenant))]
    pub async fn connect(
        &self,
        tenant: Option<&TenantId>,
        name: &str,
        platform: &str,
        store_url: &str,
        access_token: &str,
    ) -> Result<Store, RepositoryError> {
        let sql = format!(
            "INSERT INTO stores (id, user_id, name, platform, store_url, access_token, \
                is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7) \
             ON CONFLICT(store_url) DO UPDATE SET \
                access_token = excluded.access_token, \
                user_id = COALESCE(excluded.user_id, user_id), \
                is_active = 1 \
             RETURNING {COLUMNS}"
        );
        let row: StoreRow = sqlx::query_as(&sql)
            .bind(StoreId::new())
            .bind(tenant)
            .bind(name)
            .bind(platform)
            .bind(store_url)
            .bind(access_token)
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM stores WHERE id = ?1");
        let row: Option<StoreRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Store::from))
    }

    /// Record a completed sync.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist, or
    /// `RepositoryError::Database` if the update fails.
    pub async fn mark_synced(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE stores SET last_sync = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
