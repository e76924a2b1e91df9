//! Morning briefing message.

use chrono::{DateTime, Timelike, Utc};
use sqlx::SqlitePool;

use mona_core::TenantId;

use super::metrics::{BusinessMetrics, OrderWindows};

/// Sent when the briefing cannot be built.
pub const BRIEFING_FALLBACK: &str =
    "Good morning! I'm here and watching your store. How can I help today?";

fn greeting(now: DateTime<Utc>) -> &'static str {
    match now.hour() {
        0..12 => "Good morning",
        12..17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Briefing text summarising yesterday's orders.
#[must_use]
pub fn morning_briefing_text(orders: &OrderWindows, now: DateTime<Utc>) -> String {
    let greeting = greeting(now);
    let yesterday = orders.yesterday;

    if yesterday.count > 0 {
        format!(
            "{greeting}! ☀️ Here's your update:\n\n\
             Yesterday you had **{} order(s)** totalling **{}**.\n\n\
             I'm watching your store. Ask me anything.",
            yesterday.count, yesterday.revenue
        )
    } else {
        format!(
            "{greeting}! ☀️ No orders came in yesterday, but today is a new day.\n\n\
             Want me to suggest something to drive sales today?"
        )
    }
}

/// Build the briefing for a tenant. Never fails.
pub async fn morning_briefing(pool: &SqlitePool, tenant: Option<&TenantId>) -> String {
    let now = Utc::now();
    match BusinessMetrics::collect(pool, tenant, now).await {
        Ok(metrics) => morning_briefing_text(&metrics.orders, now),
        Err(e) => {
            tracing::error!(error = %e, user_id = ?tenant, "Failed to build morning briefing");
            BRIEFING_FALLBACK.to_owned()
        }
    }
}
