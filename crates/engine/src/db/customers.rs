//! Database operations for customers.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use mona_core::{CustomerId, Email, Money, TenantId};

use super::RepositoryError;
use super::products::best_name_match;
use crate::models::{Customer, NewCustomer};

const SELECT: &str = "SELECT c.id, c.user_id, c.email, c.full_name, c.phone, c.lifetime_value, \
                      c.platform, c.created_at, \
                      (SELECT COUNT(*) FROM orders o WHERE o.customer_id = c.id) AS orders_count \
                      FROM customers c";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    user_id: Option<TenantId>,
    email: String,
    full_name: Option<String>,
    phone: Option<String>,
    lifetime_value: Money,
    platform: Option<String>,
    created_at: DateTime<Utc>,
    orders_count: i64,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("customer {} email: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            email,
            full_name: row.full_name,
            phone: row.phone,
            lifetime_value: row.lifetime_value,
            platform: row.platform,
            created_at: row.created_at,
            orders_count: row.orders_count,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
    tenant: Option<&'a TenantId>,
}

impl<'a> CustomerRepository<'a> {
    /// Create a customer repository scoped to `tenant` (or all tenants).
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, tenant: Option<&'a TenantId>) -> Self {
        Self { pool, tenant }
    }

    /// List customers with their order counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored email is invalid.
    #[instrument(skip(self), fields(user_id = ?self.tenant))]
    pub async fn list(&self, limit: i64) -> Result<Vec<Customer>, RepositoryError> {
        let sql = format!(
            "{SELECT} WHERE (?1 IS NULL OR c.user_id = ?1) \
             ORDER BY c.created_at DESC, c.rowid DESC LIMIT ?2"
        );
        let rows: Vec<CustomerRow> = sqlx::query_as(&sql)
            .bind(self.tenant)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    /// Count customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE (?1 IS NULL OR user_id = ?1)")
                .bind(self.tenant)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Count customers created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers \
             WHERE (?1 IS NULL OR user_id = ?1) AND created_at >= ?2",
        )
        .bind(self.tenant)
        .bind(since)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Get a customer by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("{SELECT} WHERE c.email = ?1 AND c.user_id IS ?2");
        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(email)
            .bind(self.tenant)
            .fetch_optional(self.pool)
            .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Find a customer whose name contains `name`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!(
            "{SELECT} WHERE (?1 IS NULL OR c.user_id = ?1) AND c.full_name IS NOT NULL \
             ORDER BY c.created_at DESC, c.rowid DESC"
        );
        let rows: Vec<CustomerRow> = sqlx::query_as(&sql)
            .bind(self.tenant)
            .fetch_all(self.pool)
            .await?;

        best_name_match(rows, name, |row| row.full_name.as_deref())
            .map(Customer::try_from)
            .transpose()
    }

    /// The most recently created customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.list(1).await?.into_iter().next())
    }

    /// Insert a customer, or update the existing one with the same email.
    ///
    /// On update only non-blank name and phone values overwrite what is
    /// stored; lifetime value is replaced when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, customer), fields(user_id = ?self.tenant, email = %customer.email))]
    pub async fn upsert(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let full_name = non_blank(customer.full_name.as_deref());
        let phone = non_blank(customer.phone.as_deref());

        if let Some(existing) = self.find_by_email(&customer.email).await? {
            sqlx::query(
                "UPDATE customers SET \
                    full_name = COALESCE(?2, full_name), \
                    phone = COALESCE(?3, phone), \
                    lifetime_value = COALESCE(?4, lifetime_value) \
                 WHERE id = ?1",
            )
            .bind(existing.id)
            .bind(full_name)
            .bind(phone)
            .bind(customer.lifetime_value)
            .execute(self.pool)
            .await?;
        } else {
            sqlx::query(
                "INSERT INTO customers (id, user_id, email, full_name, phone, lifetime_value, \
                 platform, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(CustomerId::new())
            .bind(self.tenant)
            .bind(&customer.email)
            .bind(full_name)
            .bind(phone)
            .bind(customer.lifetime_value.unwrap_or(Money::ZERO))
            .bind(customer.platform.as_deref())
            .bind(Utc::now())
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_write)?;
        }

        self.find_by_email(&customer.email)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
