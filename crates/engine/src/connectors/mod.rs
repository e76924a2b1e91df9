//! Commerce platform connectors.
//!
//! A connector fetches a store's catalog and orders and normalizes them into
//! platform-neutral records; [`sync::sync_store`] writes those into the
//! tenant's tables.

pub mod shopify;
pub mod sync;

pub use shopify::{ShopifyClient, verify_webhook};
pub use sync::{SyncReport, sync_store};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use mona_core::Money;

use crate::db::RepositoryError;
use crate::models::NewProduct;

/// Errors from talking to a commerce platform.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("store has no access token")]
    MissingToken,

    #[error("webhook signature mismatch")]
    InvalidSignature,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A product as any platform describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedProduct {
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub sku: Option<String>,
    pub stock_quantity: i64,
    pub image_url: Option<String>,
    pub platform: &'static str,
}

impl From<NormalizedProduct> for NewProduct {
    fn from(p: NormalizedProduct) -> Self {
        Self {
            name: p.name,
            description: p.description,
            price: p.price,
            cost_of_goods: None,
            sku: p.sku,
            stock_quantity: p.stock_quantity,
            image_url: p.image_url,
            platform: Some(p.platform.to_owned()),
            external_id: Some(p.external_id),
        }
    }
}

/// An order as any platform describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOrder {
    pub external_id: String,
    pub customer_email: Option<String>,
    pub total_amount: Money,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub platform: &'static str,
}

/// Read access to a store on a commerce platform.
pub trait CommercePlatform: Send + Sync {
    /// All products, normalized.
    fn fetch_products(
        &self,
    ) -> impl Future<Output = Result<Vec<NormalizedProduct>, ConnectorError>> + Send;

    /// All orders regardless of status, normalized.
    fn fetch_orders(
        &self,
    ) -> impl Future<Output = Result<Vec<NormalizedOrder>, ConnectorError>> + Send;
}
