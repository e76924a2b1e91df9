//! Customer listing endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Serialize;

use super::ScopeQuery;
use crate::db::CustomerRepository;
use crate::error::Result;
use crate::middleware::RequireApiKey;
use crate::models::Customer;
use crate::state::AppState;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/customers", get(list_customers))
}

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<Customer>,
    pub total: i64,
}

/// List customers, newest first.
///
/// # Errors
///
/// Returns 400 for an invalid `user_id`, or 500 if the query fails.
pub async fn list_customers(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<CustomerListResponse>> {
    let tenant = query.tenant()?;
    let repo = CustomerRepository::new(state.pool(), tenant.as_ref());

    Ok(Json(CustomerListResponse {
        customers: repo.list(query.limit()).await?,
        total: repo.count().await?,
    }))
}
