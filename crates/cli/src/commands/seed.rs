//! Seed a demo merchant.
//!
//! Creates onboarded store settings, a small catalog (one product low on
//! stock, one sold out), three customers, and a week of orders so the
//! snapshot, alerts, and briefing all have something to report.

use chrono::{Duration, Utc};
use tracing::info;

use mona_core::{Email, Money, TenantId};
use mona_engine::db::{
    CustomerRepository, OrderRepository, ProductRepository, StoreSettingsRepository,
};
use mona_engine::models::{NewCustomer, NewOrder, NewProduct, StoreSettingsUpdate};

use super::{CommandError, connect};

/// Tenant used when none is given.
pub const DEMO_TENANT: &str = "demo-merchant";

const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Ankara Tote Bag", "15000", 42),
    ("Adire Silk Scarf", "8500", 5),
    ("Leather Sandals", "22000", 0),
    ("Beaded Necklace", "6000", 18),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Chidi Okafor", "chidi@example.com"),
    ("Amaka Eze", "amaka@example.com"),
    ("Tunde Bello", "tunde@example.com"),
];

/// Orders as `(customer index, amount, days ago, status)`.
const ORDERS: &[(usize, &str, i64, &str)] = &[
    (0, "15000", 0, "pending"),
    (1, "23500", 1, "processing"),
    (2, "6000", 1, "delivered"),
    (0, "8500", 4, "shipped"),
    (1, "30000", 9, "delivered"),
];

/// Insert the demo data under `user_id`.
///
/// Products are inserted each run; customers are upserted by email.
///
/// # Errors
///
/// Returns an error if the tenant id is invalid or any write fails.
pub async fn demo_merchant(user_id: &str) -> Result<(), CommandError> {
    let tenant =
        TenantId::parse(user_id).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let pool = connect().await?;

    StoreSettingsRepository::new(&pool)
        .upsert(
            &tenant,
            &StoreSettingsUpdate {
                store_name: Some("Mama Nkechi's Boutique".to_owned()),
                niche: Some("fashion".to_owned()),
                onboarding_completed: Some(true),
                ..StoreSettingsUpdate::default()
            },
        )
        .await?;

    let products: Vec<NewProduct> = PRODUCTS
        .iter()
        .filter_map(|(name, price, stock)| {
            Money::parse(price).map(|price| NewProduct::new(*name, price).with_stock(*stock))
        })
        .collect();
    let created = ProductRepository::new(&pool, Some(&tenant))
        .create_bulk(&products)
        .await?;
    info!(count = created, "Seeded products");

    let customers = CustomerRepository::new(&pool, Some(&tenant));
    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, email) in CUSTOMERS {
        let email = Email::parse(email).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
        let customer = customers
            .upsert(&NewCustomer {
                full_name: Some((*name).to_owned()),
                ..NewCustomer::new(email)
            })
            .await?;
        customer_ids.push(customer.id);
    }
    info!(count = customer_ids.len(), "Seeded customers");

    let orders = OrderRepository::new(&pool, Some(&tenant));
    let now = Utc::now();
    for (customer, amount, days_ago, status) in ORDERS {
        let Some(total_amount) = Money::parse(amount) else {
            continue;
        };
        orders
            .create(&NewOrder {
                external_id: None,
                customer_id: customer_ids.get(*customer).copied(),
                store_id: None,
                total_amount,
                status: (*status).to_owned(),
                platform: None,
                created_at: Some(now - Duration::days(*days_ago)),
            })
            .await?;
    }
    info!(count = ORDERS.len(), "Seeded orders");

    pool.close().await;
    info!(user_id = %tenant, "Demo merchant ready");
    Ok(())
}
