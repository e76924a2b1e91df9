//! Tenant-scoped data access against a real SQLite schema.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use mona_core::{Email, OrderStatus};
use mona_engine::db::{
    CustomerRepository, OrderRepository, ProductRepository, RepositoryError,
    StoreSettingsRepository,
};
use mona_engine::models::{NewCustomer, NewOrder, NewProduct, ProductUpdate, StoreSettingsUpdate};
use mona_engine::services::{IngestError, IngestKind, ingest_csv};
use mona_integration_tests::{add_product, memory_pool, naira, tenant};

#[tokio::test]
async fn test_stock_update_then_read_by_name() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = ProductRepository::new(&pool, Some(&merchant));
    let product = add_product(&pool, &merchant, "Red Cap", "5000", 3).await;

    repo.update(product.id, &ProductUpdate::stock(27)).await.unwrap();

    let found = repo.find_by_name("red cap").await.unwrap().unwrap();
    assert_eq!(found.id, product.id);
    assert_eq!(found.stock_quantity, 27);
}

#[tokio::test]
async fn test_find_by_name_prefers_exact_match() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    add_product(&pool, &merchant, "Cap Holder", "1000", 10).await;
    let exact = add_product(&pool, &merchant, "Cap", "2000", 10).await;

    let found = ProductRepository::new(&pool, Some(&merchant))
        .find_by_name("CAP")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, exact.id);
}

#[tokio::test]
async fn test_find_by_name_folds_non_ascii_capitals() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = ProductRepository::new(&pool, Some(&merchant));
    let bag = add_product(&pool, &merchant, "Ọja Bag", "8000", 4).await;
    let tote = add_product(&pool, &merchant, "École Tote", "6500", 12).await;

    repo.update(bag.id, &ProductUpdate::stock(15)).await.unwrap();

    let found = repo.find_by_name("Ọja Bag").await.unwrap().unwrap();
    assert_eq!(found.id, bag.id);
    assert_eq!(found.stock_quantity, 15);
    assert_eq!(repo.find_by_name("ọja bag").await.unwrap().unwrap().id, bag.id);
    assert_eq!(repo.find_by_name("école").await.unwrap().unwrap().id, tote.id);
}

#[tokio::test]
async fn test_customer_find_by_non_ascii_name() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = CustomerRepository::new(&pool, Some(&merchant));
    let created = repo
        .upsert(&NewCustomer {
            full_name: Some("Ọlá Adé".to_owned()),
            ..NewCustomer::new(Email::parse("ola@shop.ng").unwrap())
        })
        .await
        .unwrap();

    let found = repo.find_by_name("ọlá").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(repo.find_by_name("Chidi").await.unwrap().is_none());
}

#[tokio::test]
async fn test_bulk_import_skips_bad_rows() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = ProductRepository::new(&pool, Some(&merchant));

    let rows = vec![
        NewProduct::new("Ankara Tote", naira("15000")).with_stock(20),
        NewProduct::new("Adire Scarf", naira("8500")).with_sku("ADR-1"),
        NewProduct::new("   ", naira("100")),
        NewProduct::new("Refund", naira("-50")),
        NewProduct::new("Scarf Copy", naira("8500")).with_sku("ADR-1"),
        NewProduct::new("Beaded Necklace", naira("6000")),
    ];

    let created = repo.create_bulk(&rows).await.unwrap();
    assert_eq!(created, 3);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let pool = memory_pool().await;
    let (alice, bob) = (tenant("alice"), tenant("bob"));
    let tote = add_product(&pool, &alice, "Tote", "1000", 5).await;
    add_product(&pool, &bob, "Sandals", "2000", 5).await;

    let bob_products = ProductRepository::new(&pool, Some(&bob));
    assert_eq!(bob_products.count().await.unwrap(), 1);
    assert!(bob_products.find_by_name("Tote").await.unwrap().is_none());
    assert!(matches!(
        bob_products.delete(tote.id).await,
        Err(RepositoryError::NotFound)
    ));

    // Unscoped access sees every tenant
    assert_eq!(ProductRepository::new(&pool, None).count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_update_and_delete_missing_product() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = ProductRepository::new(&pool, Some(&merchant));
    let product = add_product(&pool, &merchant, "Cap", "2000", 1).await;

    repo.delete(product.id).await.unwrap();
    assert!(matches!(repo.delete(product.id).await, Err(RepositoryError::NotFound)));
    assert!(matches!(
        repo.update(product.id, &ProductUpdate::stock(4)).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_customer_upsert_by_email() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = CustomerRepository::new(&pool, Some(&merchant));
    let email = Email::parse("Ada@Shop.ng").unwrap();

    let first = repo.upsert(&NewCustomer::new(email.clone())).await.unwrap();
    let second = repo
        .upsert(&NewCustomer {
            full_name: Some("Ada Obi".to_owned()),
            ..NewCustomer::new(email)
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.display_name(), "Ada Obi");
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_order_status_update_by_reference() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let customer = CustomerRepository::new(&pool, Some(&merchant))
        .upsert(&NewCustomer {
            full_name: Some("Chidi Okafor".to_owned()),
            ..NewCustomer::new(Email::parse("chidi@example.com").unwrap())
        })
        .await
        .unwrap();

    let orders = OrderRepository::new(&pool, Some(&merchant));
    orders
        .create(&NewOrder {
            external_id: Some("1042".to_owned()),
            customer_id: Some(customer.id),
            store_id: None,
            total_amount: naira("15000"),
            status: "pending".to_owned(),
            platform: None,
            created_at: Some(Utc::now() - Duration::hours(2)),
        })
        .await
        .unwrap();

    let updated = orders
        .update_status("#1042", OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(updated.status, "shipped");
    assert_eq!(updated.customer_label(), Some("Chidi Okafor"));

    let listed = orders.list(10).await.unwrap();
    assert_eq!(listed[0].status, "shipped");

    assert!(matches!(
        orders.update_status("9999", OrderStatus::Delivered).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_store_settings_upsert_keeps_unset_fields() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let repo = StoreSettingsRepository::new(&pool);

    repo.upsert(
        &merchant,
        &StoreSettingsUpdate {
            store_name: Some("Glow Naturals".to_owned()),
            niche: Some("beauty".to_owned()),
            onboarding_completed: Some(true),
            ..StoreSettingsUpdate::default()
        },
    )
    .await
    .unwrap();
    repo.upsert(
        &merchant,
        &StoreSettingsUpdate {
            primary_color: Some("#C2185B".to_owned()),
            ..StoreSettingsUpdate::default()
        },
    )
    .await
    .unwrap();

    let settings = repo.find(Some(&merchant)).await.unwrap().unwrap();
    assert_eq!(settings.store_name_or_default(), "Glow Naturals");
    assert_eq!(settings.primary_color.as_deref(), Some("#C2185B"));
    assert_eq!(repo.onboarded_tenants().await.unwrap(), vec![merchant]);
}

#[tokio::test]
async fn test_customer_import_counts_valid_rows() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let csv = b"Email,Customer Name,Phone\nada@shop.ng,Ada Obi,0801\nnot-an-email,Bad Row,\nADA@shop.ng,,0802\nchidi@shop.ng,Chidi,\n";

    let imported = ingest_csv(&pool, Some(&merchant), IngestKind::Customers, csv)
        .await
        .unwrap();

    assert_eq!(imported, 3);
    assert_eq!(CustomerRepository::new(&pool, Some(&merchant)).count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_customer_import_surfaces_database_failure() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    pool.close().await;

    let result = ingest_csv(
        &pool,
        Some(&merchant),
        IngestKind::Customers,
        b"email\nada@shop.ng\n",
    )
    .await;

    assert!(matches!(
        result,
        Err(IngestError::Repository(RepositoryError::Database(_)))
    ));
}
