//! Order listing endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Serialize;

use super::ScopeQuery;
use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireApiKey;
use crate::models::Order;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/orders", get(list_orders))
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: i64,
}

/// List orders, newest first, joined with customer names.
///
/// # Errors
///
/// Returns 400 for an invalid `user_id`, or 500 if the query fails.
pub async fn list_orders(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<OrderListResponse>> {
    let tenant = query.tenant()?;
    let repo = OrderRepository::new(state.pool(), tenant.as_ref());

    Ok(Json(OrderListResponse {
        orders: repo.list(query.limit()).await?,
        total: repo.count().await?,
    }))
}
