//! Connected commerce platform stores.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mona_core::{StoreId, TenantId};

/// A store on an external commerce platform.
///
/// The access token is deliberately absent from `Serialize` output.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub user_id: Option<TenantId>,
    pub name: String,
    pub platform: String,
    pub store_url: String,
    #[serde(skip)]
    pub access_token: Option<String>,
    pub is_active: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
