//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Health (no API key)
//! GET    /                            - Service banner
//! GET    /health                      - Liveness
//! GET    /health/ready                - Readiness (SELECT 1)
//!
//! # Assistant
//! POST   /chat                        - Answer a merchant message
//! GET    /notifications/{user_id}     - Queued and fresh alerts
//! GET    /morning-briefing/{user_id}  - Yesterday's numbers
//! GET    /api/intelligence/{user_id}  - Raw business snapshot
//!
//! # Store data (?user_id=&limit=)
//! GET    /api/products                - List products
//! POST   /api/products                - Create a product
//! PUT    /api/products/{id}           - Update a product
//! DELETE /api/products/{id}           - Delete a product
//! GET    /api/orders                  - List orders
//! GET    /api/customers               - List customers
//! GET    /api/dashboard/stats         - Headline counts
//!
//! # Content and import
//! POST   /generate-description        - Product copy
//! POST   /ingest-csv                  - Bulk CSV import (?type=&user_id=)
//!
//! # Shopify
//! POST   /connect/shopify             - Register a store
//! GET    /sync/{store_id}             - Pull products and orders
//! POST   /webhook/shopify             - Webhook receiver (HMAC, no API key)
//! ```
//!
//! Every route outside the health group and the webhook takes
//! [`RequireApiKey`]; the webhook is authenticated by its signature.
//!
//! [`RequireApiKey`]: crate::middleware::RequireApiKey

use axum::Router;
use serde::Deserialize;

use mona_core::TenantId;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub mod chat;
pub mod content;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod ingest;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod shopify;

/// Largest page a list endpoint returns.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Page size when `limit` is omitted.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(notifications::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(dashboard::router())
        .merge(content::router())
        .merge(ingest::router())
        .merge(shopify::router())
}

/// Tenant scope and page size shared by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ScopeQuery {
    /// The tenant to scope to; `None` means unscoped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `user_id` is present but invalid.
    pub fn tenant(&self) -> Result<Option<TenantId>> {
        optional_tenant(self.user_id.as_deref())
    }

    /// Requested page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Parse an optional tenant id. Blank counts as absent.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the id is too long.
pub fn optional_tenant(raw: Option<&str>) -> Result<Option<TenantId>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(id) => path_tenant(id).map(Some),
    }
}

/// Parse a tenant id taken from the URL path.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the id is empty or too long.
pub fn path_tenant(raw: &str) -> Result<TenantId> {
    TenantId::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid user_id: {e}")))
}
