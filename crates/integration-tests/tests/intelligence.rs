//! Snapshot, briefing, and notification polling against real data.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Duration, TimeZone, Utc};

use mona_core::Severity;
use mona_engine::db::{OrderRepository, StoreSettingsRepository};
use mona_engine::intelligence::{
    Alert, AlertKind, BRIEFING_FALLBACK, SNAPSHOT_FALLBACK, build_snapshot, morning_briefing,
};
use mona_engine::models::{NewOrder, StoreSettingsUpdate};
use mona_engine::services::NotificationService;
use mona_integration_tests::{add_product, memory_pool, naira, tenant};

async fn onboard(pool: &sqlx::SqlitePool, user: &str) {
    StoreSettingsRepository::new(pool)
        .upsert(
            &tenant(user),
            &StoreSettingsUpdate {
                store_name: Some("Glow Naturals".to_owned()),
                onboarding_completed: Some(true),
                ..StoreSettingsUpdate::default()
            },
        )
        .await
        .unwrap();
}

fn low_stock(name: &str) -> Alert {
    Alert::new(
        AlertKind::LowStock,
        Severity::High,
        format!("⚠️ {name} is running low."),
        format!("Restock {name}"),
    )
}

#[tokio::test]
async fn test_snapshot_on_closed_pool_is_fallback() {
    let pool = memory_pool().await;
    pool.close().await;

    let snapshot = build_snapshot(&pool, Some(&tenant("merchant-1"))).await;
    assert_eq!(snapshot, SNAPSHOT_FALLBACK);

    let briefing = morning_briefing(&pool, Some(&tenant("merchant-1"))).await;
    assert_eq!(briefing, BRIEFING_FALLBACK);
}

#[tokio::test]
async fn test_snapshot_lists_low_stock_product() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    onboard(&pool, "merchant-1").await;
    add_product(&pool, &merchant, "Red Cap", "5000", 5).await;

    let snapshot = build_snapshot(&pool, Some(&merchant)).await;

    assert!(snapshot.starts_with("### LIVE BUSINESS SNAPSHOT"));
    assert!(snapshot.contains("Glow Naturals"));
    assert!(snapshot.contains("Red Cap — ₦5,000.00 [LOW: 5 left]"));
    assert!(snapshot.contains("Low Stock: 1 | Out of Stock: 0"));
}

#[tokio::test]
async fn test_snapshot_is_tenant_scoped() {
    let pool = memory_pool().await;
    add_product(&pool, &tenant("alice"), "Alice Tote", "1000", 50).await;
    add_product(&pool, &tenant("bob"), "Bob Sandals", "2000", 50).await;

    let snapshot = build_snapshot(&pool, Some(&tenant("bob"))).await;
    assert!(snapshot.contains("Bob Sandals"));
    assert!(!snapshot.contains("Alice Tote"));
}

#[test]
fn test_same_alert_kind_is_queued_once() {
    let notifications = NotificationService::new(20);
    let merchant = tenant("merchant-1");

    assert!(notifications.enqueue(&merchant, low_stock("Red Cap")));
    assert!(!notifications.enqueue(&merchant, low_stock("Blue Hat")));

    let drained = notifications.drain(&merchant);
    assert_eq!(drained.len(), 1);
    assert!(drained[0].message.contains("Red Cap"));
    assert!(notifications.drain(&merchant).is_empty());
}

#[test]
fn test_queue_evicts_oldest_at_capacity() {
    let notifications = NotificationService::new(2);
    let merchant = tenant("merchant-1");
    let alert = |kind| Alert::new(kind, Severity::Info, "update", "View");

    notifications.enqueue(&merchant, alert(AlertKind::DailySummary));
    notifications.enqueue(&merchant, alert(AlertKind::NewCustomers));
    notifications.enqueue(&merchant, alert(AlertKind::NoRecentOrders));

    let kinds: Vec<AlertKind> = notifications
        .drain(&merchant)
        .iter()
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, vec![AlertKind::NewCustomers, AlertKind::NoRecentOrders]);
}

#[tokio::test]
async fn test_poll_queues_alerts_for_onboarded_tenants_once() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    onboard(&pool, "merchant-1").await;
    add_product(&pool, &merchant, "Red Cap", "5000", 5).await;
    add_product(&pool, &merchant, "Sandals", "22000", 0).await;
    // Not onboarded, never scanned
    add_product(&pool, &tenant("drifter"), "Mug", "1500", 2).await;

    let notifications = NotificationService::new(20);
    let noon = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    let first = notifications.poll_once(&pool, noon).await.unwrap();
    let second = notifications.poll_once(&pool, noon).await.unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(notifications.pending(&tenant("drifter")), 0);

    let kinds: Vec<AlertKind> = notifications
        .drain(&merchant)
        .iter()
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, vec![AlertKind::LowStock, AlertKind::OutOfStock]);
}

#[tokio::test]
async fn test_poll_in_briefing_window_leads_with_briefing() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    onboard(&pool, "merchant-1").await;
    let morning = Utc.with_ymd_and_hms(2026, 3, 2, 8, 10, 0).unwrap();
    OrderRepository::new(&pool, Some(&merchant))
        .create(&NewOrder {
            external_id: None,
            customer_id: None,
            store_id: None,
            total_amount: naira("15000"),
            status: "pending".to_owned(),
            platform: None,
            created_at: Some(morning - Duration::days(1)),
        })
        .await
        .unwrap();

    let notifications = NotificationService::new(20);
    notifications.poll_once(&pool, morning).await.unwrap();

    let alerts = notifications.drain(&merchant);
    assert_eq!(alerts[0].kind, AlertKind::MorningBriefing);
    assert!(alerts[0].message.contains("₦15,000.00"));
}

#[tokio::test]
async fn test_poller_stops_on_shutdown() {
    let pool = memory_pool().await;
    let notifications = NotificationService::new(20);

    notifications.start(pool.clone(), std::time::Duration::from_secs(3600));
    // A second start is ignored
    notifications.start(pool, std::time::Duration::from_secs(3600));

    tokio::time::timeout(std::time::Duration::from_secs(5), notifications.shutdown())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_poller_restarts_after_shutdown() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    onboard(&pool, "merchant-1").await;
    add_product(&pool, &merchant, "Red Cap", "5000", 5).await;
    let notifications = NotificationService::new(20);
    let hour = std::time::Duration::from_secs(3600);

    notifications.start(pool.clone(), hour);
    tokio::time::timeout(std::time::Duration::from_secs(5), notifications.shutdown())
        .await
        .unwrap();
    notifications.drain(&merchant);

    notifications.start(pool, hour);
    // The first tick fires immediately
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while notifications.pending(&merchant) == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(5), notifications.shutdown())
        .await
        .unwrap();
}
