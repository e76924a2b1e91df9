//! Product domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mona_core::{Money, ProductId, StockLevel, TenantId};

/// A product in a merchant's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub user_id: Option<TenantId>,
    /// Identifier on the commerce platform the product was synced from.
    pub external_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub cost_of_goods: Option<Money>,
    pub sku: Option<String>,
    pub stock_quantity: i64,
    pub image_url: Option<String>,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Classify the current stock quantity.
    #[must_use]
    pub const fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.stock_quantity)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub cost_of_goods: Option<Money>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl NewProduct {
    /// A product with just a name and price.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    /// Set the opening stock quantity.
    #[must_use]
    pub const fn with_stock(mut self, stock_quantity: i64) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    /// Set the SKU.
    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Reason this row cannot be stored, if any.
    #[must_use]
    pub fn problem(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("missing name")
        } else if self.price.amount().is_sign_negative() {
            Some("negative price")
        } else {
            None
        }
    }
}

/// Partial product update.
///
/// Only these fields can be changed after creation; `None` leaves the column
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductUpdate {
    /// Update that only changes the stock quantity.
    #[must_use]
    pub fn stock(quantity: i64) -> Self {
        Self {
            stock_quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Whether the update touches no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.sku.is_none()
            && self.stock_quantity.is_none()
            && self.image_url.is_none()
    }
}
