//! Customer domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mona_core::{CustomerId, Email, Money, TenantId};

/// A customer with their order count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: Option<TenantId>,
    pub email: Email,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub lifetime_value: Money,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub orders_count: i64,
}

impl Customer {
    /// Full name if known, otherwise the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Input for upserting a customer by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub email: Email,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub lifetime_value: Option<Money>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl NewCustomer {
    /// A customer known only by email.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self {
            email,
            full_name: None,
            phone: None,
            lifetime_value: None,
            platform: None,
        }
    }
}
