//! Dashboard statistics endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use mona_core::{LOW_STOCK_THRESHOLD, Money};

use super::ScopeQuery;
use crate::db::orders::OrderPoint;
use crate::db::{CustomerRepository, OrderRepository, ProductRepository};
use crate::error::Result;
use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// Window counted as "recent" on the dashboard.
const RECENT_DAYS: i64 = 30;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(stats))
}

/// Headline numbers for the merchant dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub total_revenue: Money,
    /// Orders placed in the last 30 days.
    pub recent_orders: usize,
    /// Products in stock but under the low-stock threshold.
    pub low_stock_products: usize,
}

/// Revenue across all orders and the count placed since `since`.
#[must_use]
pub fn revenue_summary(points: &[OrderPoint], since: DateTime<Utc>) -> (Money, usize) {
    let revenue = points.iter().map(|p| p.total_amount).sum();
    let recent = points.iter().filter(|p| p.created_at >= since).count();
    (revenue, recent)
}

/// Dashboard statistics for a tenant.
///
/// # Errors
///
/// Returns 400 for an invalid `user_id`, or 500 if a query fails.
pub async fn stats(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<DashboardStats>> {
    let tenant = query.tenant()?;
    let pool = state.pool();
    let products = ProductRepository::new(pool, tenant.as_ref());
    let orders = OrderRepository::new(pool, tenant.as_ref());

    let (total_revenue, recent_orders) = revenue_summary(
        &orders.timeline().await?,
        Utc::now() - Duration::days(RECENT_DAYS),
    );
    let low_stock_products = products
        .low_stock(LOW_STOCK_THRESHOLD)
        .await?
        .iter()
        .filter(|p| p.stock_level().is_low())
        .count();

    Ok(Json(DashboardStats {
        total_products: products.count().await?,
        total_orders: orders.count().await?,
        total_customers: CustomerRepository::new(pool, tenant.as_ref()).count().await?,
        total_revenue,
        recent_orders,
        low_stock_products,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_summary() {
        let now = Utc::now();
        let point = |amount: &str, days_ago: i64| OrderPoint {
            total_amount: Money::parse(amount).unwrap(),
            created_at: now - Duration::days(days_ago),
        };
        let points = [point("15000", 1), point("2500", 10), point("4000", 45)];

        let (revenue, recent) = revenue_summary(&points, now - Duration::days(RECENT_DAYS));
        assert_eq!(revenue, Money::parse("21500").unwrap());
        assert_eq!(recent, 2);
    }

    #[test]
    fn test_revenue_summary_empty() {
        assert_eq!(revenue_summary(&[], Utc::now()), (Money::ZERO, 0));
    }
}
