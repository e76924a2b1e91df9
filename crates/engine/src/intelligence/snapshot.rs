//! The textual business snapshot injected into every assistant prompt.

use askama::Template;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use mona_core::{Money, TenantId};

use super::metrics::{BusinessMetrics, PRODUCT_LIST_CAP};
use crate::models::Product;

/// Returned whenever the snapshot cannot be built.
pub const SNAPSHOT_FALLBACK: &str =
    "### LIVE BUSINESS SNAPSHOT\nUnable to load store data at this time.";

/// Names listed per stock alert.
const ALERT_NAME_LIMIT: usize = 3;

#[derive(Template)]
#[template(path = "assistant/snapshot.txt")]
struct SnapshotTemplate<'a> {
    store_name: &'a str,
    niche: &'a str,
    generated_at: String,
    total_products: i64,
    in_stock: i64,
    low_stock: usize,
    out_of_stock: usize,
    product_list: String,
    total_orders: usize,
    orders_today: usize,
    orders_this_week: usize,
    last_order: String,
    pending_shipments: i64,
    total_revenue: Money,
    revenue_today: Money,
    revenue_this_week: Money,
    trend: String,
    total_customers: i64,
    new_customers: i64,
    last_customer: &'a str,
    alerts: String,
}

/// Build the snapshot for a tenant.
///
/// Never fails: any query or render error is logged and
/// [`SNAPSHOT_FALLBACK`] is returned.
pub async fn build_snapshot(pool: &SqlitePool, tenant: Option<&TenantId>) -> String {
    let now = Utc::now();
    match BusinessMetrics::collect(pool, tenant, now).await {
        Ok(metrics) => render_snapshot(&metrics, now),
        Err(e) => {
            tracing::error!(error = %e, user_id = ?tenant, "Failed to load business snapshot");
            SNAPSHOT_FALLBACK.to_owned()
        }
    }
}

/// Render metrics as snapshot text.
#[must_use]
pub fn render_snapshot(metrics: &BusinessMetrics, now: DateTime<Utc>) -> String {
    let out_of_stock = metrics.out_of_stock.len();
    let last_order = metrics.last_order.as_ref().map_or_else(
        || "No orders yet".to_owned(),
        |order| {
            format!(
                "{} — {} ({})",
                order.customer_label().unwrap_or("Unknown customer"),
                order.total_amount,
                time_ago(order.created_at, now)
            )
        },
    );

    let template = SnapshotTemplate {
        store_name: &metrics.store_name,
        niche: &metrics.niche,
        generated_at: now.format("%Y-%m-%d %H:%M UTC").to_string(),
        total_products: metrics.total_products,
        in_stock: metrics.total_products - out_of_stock as i64,
        low_stock: metrics.low_stock.len(),
        out_of_stock,
        product_list: product_list(&metrics.products, metrics.total_products),
        total_orders: metrics.orders.total.count,
        orders_today: metrics.orders.today.count,
        orders_this_week: metrics.orders.this_week.count,
        last_order,
        pending_shipments: metrics.pending_shipments,
        total_revenue: metrics.orders.total.revenue,
        revenue_today: metrics.orders.today.revenue,
        revenue_this_week: metrics.orders.this_week.revenue,
        trend: trend_text(
            metrics.orders.this_week.revenue,
            metrics.orders.last_week.revenue,
        ),
        total_customers: metrics.total_customers,
        new_customers: metrics.new_customers_this_week,
        last_customer: metrics
            .last_customer
            .as_ref()
            .map_or("No customers yet", |c| c.display_name()),
        alerts: snapshot_alerts(metrics).join("\n"),
    };

    template.render().map_or_else(
        |e| {
            tracing::error!(error = %e, "Failed to render business snapshot");
            SNAPSHOT_FALLBACK.to_owned()
        },
        |text| text.trim().to_owned(),
    )
}

fn product_list(products: &[Product], total: i64) -> String {
    if products.is_empty() {
        return "  No products added yet".to_owned();
    }

    let mut lines: Vec<String> = products
        .iter()
        .take(PRODUCT_LIST_CAP)
        .map(|p| format!("  • {} — {} {}", p.name, p.price, p.stock_level().note()))
        .collect();

    let shown = lines.len() as i64;
    if total > shown {
        lines.push(format!("  ... and {} more products", total - shown));
    }
    lines.join("\n")
}

/// Week-over-week revenue trend.
#[must_use]
pub fn trend_text(this_week: Money, last_week: Money) -> String {
    if last_week.is_positive() {
        let pct = (this_week.to_f64() - last_week.to_f64()) / last_week.to_f64() * 100.0;
        if this_week > last_week {
            format!("↑ {pct:.1}% vs last week 🔥")
        } else if this_week < last_week {
            format!("↓ {:.1}% vs last week", pct.abs())
        } else {
            "→ Same as last week".to_owned()
        }
    } else if this_week.is_positive() {
        "↑ First sales this week!".to_owned()
    } else {
        "No sales yet this week".to_owned()
    }
}

fn snapshot_alerts(metrics: &BusinessMetrics) -> Vec<String> {
    let names = |products: &[Product]| {
        products
            .iter()
            .take(ALERT_NAME_LIMIT)
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut alerts = Vec::new();
    if !metrics.low_stock.is_empty() {
        alerts.push(format!("⚠️ Low stock: {}", names(&metrics.low_stock)));
    }
    if !metrics.out_of_stock.is_empty() {
        alerts.push(format!("🚨 Out of stock: {}", names(&metrics.out_of_stock)));
    }
    if metrics.orders.total.count == 0 {
        alerts.push("📦 No orders yet — store needs first sale".to_owned());
    } else if metrics.orders.this_week.count == 0 {
        alerts.push("📉 No orders this week yet".to_owned());
    }

    if alerts.is_empty() {
        alerts.push("✅ No critical alerts".to_owned());
    }
    alerts
}

/// Coarse relative time, e.g. `5m ago` or `yesterday`.
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let seconds = diff.num_seconds().max(0);

    match (diff.num_days(), seconds) {
        (_, s) if s < 60 => "just now".to_owned(),
        (_, s) if s < 3_600 => format!("{}m ago", s / 60),
        (0, s) => format!("{}h ago", s / 3_600),
        (1, _) => "yesterday".to_owned(),
        (days, _) => format!("{days} days ago"),
    }
}
