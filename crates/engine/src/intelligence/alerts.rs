//! Proactive merchant alerts.

use serde::{Deserialize, Serialize};

use mona_core::Severity;

use super::metrics::BusinessMetrics;

/// Out-of-stock products reported individually.
const OUT_OF_STOCK_ALERT_LIMIT: usize = 3;

/// What an alert is about. Queues hold at most one alert per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowStock,
    OutOfStock,
    DailySummary,
    NoRecentOrders,
    RevenueMilestone,
    NewCustomers,
    MorningBriefing,
}

/// A notification for the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    /// Suggested follow-up, shown as a button label.
    pub action: Option<String>,
}

impl Alert {
    /// Build an alert.
    #[must_use]
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            action: Some(action.into()),
        }
    }

    /// The daily briefing, which has no follow-up action.
    #[must_use]
    pub fn briefing(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::MorningBriefing,
            severity: Severity::Info,
            message: message.into(),
            action: None,
        }
    }
}

/// Alerts warranted by the current metrics, most specific first.
#[must_use]
pub fn compute_alerts(metrics: &BusinessMetrics) -> Vec<Alert> {
    let orders = &metrics.orders;
    let mut alerts = Vec::new();

    for product in &metrics.low_stock {
        alerts.push(Alert::new(
            AlertKind::LowStock,
            Severity::High,
            format!(
                "⚠️ {} is running low — only {} left.",
                product.name, product.stock_quantity
            ),
            format!("Restock {}", product.name),
        ));
    }

    for product in metrics.out_of_stock.iter().take(OUT_OF_STOCK_ALERT_LIMIT) {
        alerts.push(Alert::new(
            AlertKind::OutOfStock,
            Severity::Critical,
            format!("🚨 {} is completely out of stock.", product.name),
            format!("Restock {} immediately", product.name),
        ));
    }

    if orders.today.count > 0 {
        alerts.push(Alert::new(
            AlertKind::DailySummary,
            Severity::Info,
            format!(
                "🔥 You've had {} order(s) today — {} in revenue.",
                orders.today.count, orders.today.revenue
            ),
            "View orders",
        ));
    }

    if orders.last_48h.count == 0 && orders.total.count > 0 {
        alerts.push(Alert::new(
            AlertKind::NoRecentOrders,
            Severity::Medium,
            "📉 No orders in the last 48 hours. Want me to suggest a quick promo?",
            "Get promo ideas",
        ));
    }

    let (this_week, last_week) = (orders.this_week.revenue, orders.last_week.revenue);
    if last_week.is_positive() && this_week > last_week {
        let pct = (this_week.to_f64() - last_week.to_f64()) / last_week.to_f64() * 100.0;
        alerts.push(Alert::new(
            AlertKind::RevenueMilestone,
            Severity::Success,
            format!("🎉 You're up {pct:.0}% in revenue compared to last week. Keep it up!"),
            "View analytics",
        ));
    }

    if metrics.new_customers_this_week > 0 {
        alerts.push(Alert::new(
            AlertKind::NewCustomers,
            Severity::Info,
            format!(
                "👥 {} new customer(s) joined your store this week.",
                metrics.new_customers_this_week
            ),
            "View customers",
        ));
    }

    alerts
}

/// Keep the first alert of each kind, preserving order.
#[must_use]
pub fn dedup_by_kind(alerts: impl IntoIterator<Item = Alert>) -> Vec<Alert> {
    let mut seen = std::collections::HashSet::new();
    alerts
        .into_iter()
        .filter(|alert| seen.insert(alert.kind))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use mona_core::{Money, ProductId};

    use super::*;
    use crate::intelligence::metrics::{OrderWindows, Window};
    use crate::models::Product;

    fn naira(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    fn product(name: &str, stock: i64) -> Product {
        Product {
            id: ProductId::new(),
            user_id: None,
            external_id: None,
            name: name.to_owned(),
            description: None,
            price: naira("1000"),
            cost_of_goods: None,
            sku: None,
            stock_quantity: stock,
            image_url: None,
            platform: None,
            created_at: Utc::now(),
        }
    }

    fn empty_metrics() -> BusinessMetrics {
        BusinessMetrics {
            store_name: "Your Store".to_owned(),
            niche: "general".to_owned(),
            total_products: 0,
            products: Vec::new(),
            low_stock: Vec::new(),
            out_of_stock: Vec::new(),
            orders: OrderWindows::default(),
            last_order: None,
            total_customers: 0,
            new_customers_this_week: 0,
            last_customer: None,
            pending_shipments: 0,
        }
    }

    #[test]
    fn test_quiet_store_has_no_alerts() {
        assert!(compute_alerts(&empty_metrics()).is_empty());
    }

    #[test]
    fn test_stock_alerts() {
        let mut metrics = empty_metrics();
        metrics.low_stock = vec![product("Red Cap", 4)];
        metrics.out_of_stock = (0..5).map(|i| product(&format!("Gone {i}"), 0)).collect();

        let alerts = compute_alerts(&metrics);
        assert_eq!(alerts[0].kind, AlertKind::LowStock);
        assert_eq!(alerts[0].message, "⚠️ Red Cap is running low — only 4 left.");
        assert_eq!(alerts[0].severity, Severity::High);
        let out = alerts.iter().filter(|a| a.kind == AlertKind::OutOfStock).count();
        assert_eq!(out, 3);
    }

    #[test]
    fn test_order_alerts() {
        let mut metrics = empty_metrics();
        metrics.orders = OrderWindows {
            total: Window { count: 4, revenue: naira("4000") },
            this_week: Window { count: 2, revenue: naira("3000") },
            last_week: Window { count: 2, revenue: naira("1000") },
            ..OrderWindows::default()
        };

        let kinds: Vec<_> = compute_alerts(&metrics).into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::NoRecentOrders, AlertKind::RevenueMilestone]);

        let milestone = compute_alerts(&metrics).pop().unwrap();
        assert_eq!(
            milestone.message,
            "🎉 You're up 200% in revenue compared to last week. Keep it up!"
        );
    }

    #[test]
    fn test_daily_summary() {
        let mut metrics = empty_metrics();
        metrics.orders.total = Window { count: 2, revenue: naira("25000") };
        metrics.orders.today = metrics.orders.total;
        metrics.orders.last_48h = metrics.orders.total;

        let alert = compute_alerts(&metrics).remove(0);
        assert_eq!(alert.kind, AlertKind::DailySummary);
        assert_eq!(alert.message, "🔥 You've had 2 order(s) today — ₦25,000.00 in revenue.");
    }

    #[test]
    fn test_dedup_by_kind_keeps_first() {
        let alerts = vec![
            Alert::new(AlertKind::LowStock, Severity::High, "a", "x"),
            Alert::new(AlertKind::NewCustomers, Severity::Info, "b", "y"),
            Alert::new(AlertKind::LowStock, Severity::High, "c", "z"),
        ];
        let deduped = dedup_by_kind(alerts);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].message, "a");
    }

    #[test]
    fn test_alert_serializes_type_field() {
        let alert = Alert::new(AlertKind::OutOfStock, Severity::Critical, "m", "a");
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "out_of_stock");
        assert_eq!(json["severity"], "critical");
    }
}
