//! Copy a platform store's products and orders into the tenant's tables.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use mona_core::Email;

use crate::db::{
    CustomerRepository, OrderRepository, ProductRepository, RepositoryError, StoreRepository,
};
use crate::models::{NewCustomer, NewOrder, NewProduct, Store};

use super::{CommercePlatform, ConnectorError};

/// Counts from one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Products returned by the platform.
    pub products_synced: usize,
    /// Orders returned by the platform.
    pub orders_synced: usize,
    /// Products not seen before and now stored.
    pub products_created: usize,
    /// Orders not seen before and now stored.
    pub orders_created: usize,
}

/// Pull everything from `platform` into the store owner's tenant.
///
/// Only unseen external IDs are inserted; existing rows are left untouched.
/// Order emails are upserted as customers.
///
/// # Errors
///
/// Returns an error if the platform cannot be read or a database write fails
/// for reasons other than a duplicate.
#[instrument(skip(pool, platform), fields(store_id = %store.id, user_id = ?store.user_id))]
pub async fn sync_store<P: CommercePlatform>(
    pool: &SqlitePool,
    store: &Store,
    platform: &P,
) -> Result<SyncReport, ConnectorError> {
    let tenant = store.user_id.as_ref();
    let products = platform.fetch_products().await?;
    let orders = platform.fetch_orders().await?;

    let mut report = SyncReport {
        products_synced: products.len(),
        orders_synced: orders.len(),
        ..SyncReport::default()
    };

    let product_repo = ProductRepository::new(pool, tenant);
    for product in products {
        if product_repo
            .find_by_external_id(&product.external_id)
            .await?
            .is_some()
        {
            continue;
        }
        let external_id = product.external_id.clone();
        match product_repo.create(&NewProduct::from(product)).await {
            Ok(_) => report.products_created += 1,
            Err(RepositoryError::Conflict(reason)) => {
                warn!(external_id = %external_id, reason = %reason, "Skipping conflicting product");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let customer_repo = CustomerRepository::new(pool, tenant);
    let order_repo = OrderRepository::new(pool, tenant);
    for order in orders {
        let customer_id = match order.customer_email.as_deref().map(Email::parse) {
            Some(Ok(email)) => {
                let customer = NewCustomer {
                    platform: Some(order.platform.to_owned()),
                    ..NewCustomer::new(email)
                };
                Some(customer_repo.upsert(&customer).await?.id)
            }
            Some(Err(e)) => {
                warn!(external_id = %order.external_id, error = %e, "Order has an unusable email");
                None
            }
            None => None,
        };

        if order_repo
            .find_by_external_id(&order.external_id)
            .await?
            .is_some()
        {
            continue;
        }

        let new_order = NewOrder {
            external_id: Some(order.external_id),
            customer_id,
            store_id: Some(store.id),
            total_amount: order.total_amount,
            status: order.status,
            platform: Some(order.platform.to_owned()),
            created_at: order.created_at,
        };
        match order_repo.create(&new_order).await {
            Ok(_) => report.orders_created += 1,
            Err(RepositoryError::Conflict(reason)) => {
                warn!(reason = %reason, "Skipping conflicting order");
            }
            Err(e) => return Err(e.into()),
        }
    }

    StoreRepository::new(pool).mark_synced(store.id).await?;
    info!(
        products_created = report.products_created,
        orders_created = report.orders_created,
        "Store sync complete"
    );
    Ok(report)
}
