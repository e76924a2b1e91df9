//! Database operations for products.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use mona_core::{Money, ProductId, TenantId};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductUpdate};

const COLUMNS: &str = "id, user_id, external_id, name, description, price, cost_of_goods, \
                       sku, stock_quantity, image_url, platform, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    user_id: Option<TenantId>,
    external_id: Option<String>,
    name: String,
    description: Option<String>,
    price: Money,
    cost_of_goods: Option<Money>,
    sku: Option<String>,
    stock_quantity: i64,
    image_url: Option<String>,
    platform: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            external_id: row.external_id,
            name: row.name,
            description: row.description,
            price: row.price,
            cost_of_goods: row.cost_of_goods,
            sku: row.sku,
            stock_quantity: row.stock_quantity,
            image_url: row.image_url,
            platform: row.platform,
            created_at: row.created_at,
        }
    }
}

/// Pick the candidate whose name contains `needle`, ignoring case.
///
/// SQLite's `LOWER` only folds ASCII, so names are compared here. Candidates
/// arrive newest first; an exact match wins over the first partial one.
pub(crate) fn best_name_match<T>(
    candidates: Vec<T>,
    needle: &str,
    name_of: impl Fn(&T) -> Option<&str>,
) -> Option<T> {
    let needle = needle.trim().to_lowercase();
    let mut partial = None;
    for candidate in candidates {
        let Some(name) = name_of(&candidate).map(|n| n.trim().to_lowercase()) else {
            continue;
        };
        if name == needle {
            return Some(candidate);
        }
        if partial.is_none() && name.contains(&needle) {
            partial = Some(candidate);
        }
    }
    partial
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
    tenant: Option<&'a TenantId>,
}

impl<'a> ProductRepository<'a> {
    /// Create a product repository scoped to `tenant` (or all tenants).
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, tenant: Option<&'a TenantId>) -> Self {
        Self { pool, tenant }
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = ?self.tenant))]
    pub async fn list(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products WHERE (?1 IS NULL OR user_id = ?1) \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(self.tenant)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Count products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE (?1 IS NULL OR user_id = ?1)")
                .bind(self.tenant)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)"
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(self.tenant)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Find a product whose name contains `name`, ignoring case.
    ///
    /// An exact (case-insensitive) match wins over partial matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = ?self.tenant))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products WHERE (?1 IS NULL OR user_id = ?1) \
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(self.tenant)
            .fetch_all(self.pool)
            .await?;

        Ok(best_name_match(rows, name, |row| Some(row.name.as_str())).map(Product::from))
    }

    /// Get a product by its platform identifier.
    ///
    /// External IDs are globally unique, so this lookup is not tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE external_id = ?1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(external_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Products with stock strictly below `threshold`, lowest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE (?1 IS NULL OR user_id = ?1) AND stock_quantity < ?2 \
             ORDER BY stock_quantity ASC, name ASC"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(self.tenant)
            .bind(threshold)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate SKU or external ID,
    /// or `RepositoryError::Database` if the insert fails otherwise.
    #[instrument(skip(self, product), fields(user_id = ?self.tenant, name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products (id, user_id, external_id, name, description, price, \
             cost_of_goods, sku, stock_quantity, image_url, platform, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             RETURNING {COLUMNS}"
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(ProductId::new())
            .bind(self.tenant)
            .bind(product.external_id.as_deref())
            .bind(product.name.trim())
            .bind(product.description.as_deref())
            .bind(product.price)
            .bind(product.cost_of_goods)
            .bind(product.sku.as_deref())
            .bind(product.stock_quantity)
            .bind(product.image_url.as_deref())
            .bind(product.platform.as_deref())
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        Ok(row.into())
    }

    /// Create many products in one transaction.
    ///
    /// Rows with no name, a negative price, or a clashing SKU/external ID are
    /// skipped. Returns how many rows were created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on any failure other than a
    /// per-row constraint violation; nothing is committed in that case.
    #[instrument(skip(self, products), fields(user_id = ?self.tenant, rows = products.len()))]
    pub async fn create_bulk(&self, products: &[NewProduct]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut created = 0;

        for (index, product) in products.iter().enumerate() {
            if let Some(problem) = product.problem() {
                tracing::warn!(index, problem, "Skipping product row");
                continue;
            }

            let result = sqlx::query(
                "INSERT INTO products (id, user_id, external_id, name, description, price, \
                 cost_of_goods, sku, stock_quantity, image_url, platform, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )
            .bind(ProductId::new())
            .bind(self.tenant)
            .bind(product.external_id.as_deref())
            .bind(product.name.trim())
            .bind(product.description.as_deref())
            .bind(product.price)
            .bind(product.cost_of_goods)
            .bind(product.sku.as_deref())
            .bind(product.stock_quantity)
            .bind(product.image_url.as_deref())
            .bind(product.platform.as_deref())
            .bind(now)
            .execute(&mut *tx)
            .await;

            match result.map_err(RepositoryError::from_write) {
                Ok(_) => created += 1,
                Err(RepositoryError::Conflict(reason)) => {
                    tracing::warn!(index, %reason, "Skipping duplicate product row");
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;
        tracing::info!(count = created, "Products imported");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product with this ID is
    /// visible to the tenant, `RepositoryError::Conflict` for a duplicate SKU,
    /// or `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, update), fields(user_id = ?self.tenant, product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET \
                name = COALESCE(?3, name), \
                description = COALESCE(?4, description), \
                price = COALESCE(?5, price), \
                sku = COALESCE(?6, sku), \
                stock_quantity = COALESCE(?7, stock_quantity), \
                image_url = COALESCE(?8, image_url) \
             WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2) \
             RETURNING {COLUMNS}"
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(self.tenant)
            .bind(update.name.as_deref().map(str::trim))
            .bind(update.description.as_deref())
            .bind(update.price)
            .bind(update.sku.as_deref())
            .bind(update.stock_quantity)
            .bind(update.image_url.as_deref())
            .fetch_optional(self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product with this ID is
    /// visible to the tenant, or `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self), fields(user_id = ?self.tenant))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM products WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)")
                .bind(id)
                .bind(self.tenant)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
