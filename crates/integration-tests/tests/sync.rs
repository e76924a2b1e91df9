//! Commerce platform sync with an in-process platform.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use mona_core::Email;
use mona_engine::connectors::{
    CommercePlatform, ConnectorError, NormalizedOrder, NormalizedProduct, sync_store,
};
use mona_engine::db::{CustomerRepository, OrderRepository, ProductRepository, StoreRepository};
use mona_integration_tests::{memory_pool, naira, tenant};

struct FakePlatform {
    products: Vec<NormalizedProduct>,
    orders: Vec<NormalizedOrder>,
}

impl CommercePlatform for FakePlatform {
    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, ConnectorError> {
        Ok(self.products.clone())
    }

    async fn fetch_orders(&self) -> Result<Vec<NormalizedOrder>, ConnectorError> {
        Ok(self.orders.clone())
    }
}

struct DownPlatform;

impl CommercePlatform for DownPlatform {
    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, ConnectorError> {
        Err(ConnectorError::Api {
            status: 503,
            body: "maintenance".to_owned(),
        })
    }

    async fn fetch_orders(&self) -> Result<Vec<NormalizedOrder>, ConnectorError> {
        Ok(Vec::new())
    }
}

fn product(external_id: &str, name: &str, stock: i64) -> NormalizedProduct {
    NormalizedProduct {
        external_id: external_id.to_owned(),
        name: name.to_owned(),
        description: None,
        price: naira("12000"),
        sku: None,
        stock_quantity: stock,
        image_url: None,
        platform: "shopify",
    }
}

fn order(external_id: &str, email: Option<&str>) -> NormalizedOrder {
    NormalizedOrder {
        external_id: external_id.to_owned(),
        customer_email: email.map(str::to_owned),
        total_amount: naira("24000"),
        status: "paid".to_owned(),
        created_at: Some(Utc::now() - Duration::days(1)),
        platform: "shopify",
    }
}

#[tokio::test]
async fn test_sync_inserts_only_unseen_records() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let store = StoreRepository::new(&pool)
        .connect(
            Some(&merchant),
            "glow-naturals",
            "shopify",
            "glow-naturals.myshopify.com",
            "shpat_test",
        )
        .await
        .unwrap();
    let platform = FakePlatform {
        products: vec![product("p-1", "Shea Butter", 30), product("p-2", "Black Soap", 4)],
        orders: vec![
            order("o-1", Some("Ada@Shop.ng")),
            order("o-2", Some("ada@shop.ng")),
            order("o-3", Some("not-an-email")),
        ],
    };

    let first = sync_store(&pool, &store, &platform).await.unwrap();
    assert_eq!(first.products_synced, 2);
    assert_eq!(first.orders_synced, 3);
    assert_eq!(first.products_created, 2);
    assert_eq!(first.orders_created, 3);

    let second = sync_store(&pool, &store, &platform).await.unwrap();
    assert_eq!(second.products_created, 0);
    assert_eq!(second.orders_created, 0);

    assert_eq!(
        ProductRepository::new(&pool, Some(&merchant)).count().await.unwrap(),
        2
    );
    assert_eq!(
        OrderRepository::new(&pool, Some(&merchant)).count().await.unwrap(),
        3
    );

    let customers = CustomerRepository::new(&pool, Some(&merchant));
    assert_eq!(customers.count().await.unwrap(), 1);
    assert!(
        customers
            .find_by_email(&Email::parse("ada@shop.ng").unwrap())
            .await
            .unwrap()
            .is_some()
    );

    let synced = StoreRepository::new(&pool)
        .find_by_id(store.id)
        .await
        .unwrap()
        .unwrap();
    assert!(synced.last_sync.is_some());
}

#[tokio::test]
async fn test_platform_failure_propagates() {
    let pool = memory_pool().await;
    let store = StoreRepository::new(&pool)
        .connect(None, "down", "shopify", "down.myshopify.com", "shpat_test")
        .await
        .unwrap();

    let err = sync_store(&pool, &store, &DownPlatform).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Api { status: 503, .. }));

    let unsynced = StoreRepository::new(&pool)
        .find_by_id(store.id)
        .await
        .unwrap()
        .unwrap();
    assert!(unsynced.last_sync.is_none());
}
