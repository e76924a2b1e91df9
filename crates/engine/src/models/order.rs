//! Order domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mona_core::{CustomerId, Money, OrderId, StoreId, TenantId};

/// An order, joined with the customer it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<TenantId>,
    pub external_id: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub store_id: Option<StoreId>,
    pub total_amount: Money,
    /// Free text: platform imports keep their own status vocabulary.
    pub status: String,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

impl Order {
    /// Best human label for the buyer: name, then email.
    #[must_use]
    pub fn customer_label(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.customer_email.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Input for recording an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub external_id: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub store_id: Option<StoreId>,
    pub total_amount: Money,
    pub status: String,
    pub platform: Option<String>,
    /// Defaults to now when absent.
    pub created_at: Option<DateTime<Utc>>,
}
