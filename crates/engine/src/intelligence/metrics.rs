//! Aggregated counts and sums for one tenant.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use mona_core::{LOW_STOCK_THRESHOLD, Money, TenantId};

use crate::db::orders::OrderPoint;
use crate::db::{
    CustomerRepository, OrderRepository, ProductRepository, RepositoryError, ShipmentRepository,
    StoreSettingsRepository,
};
use crate::models::store_settings::{DEFAULT_NICHE, DEFAULT_STORE_NAME};
use crate::models::{Customer, Order, Product};

/// Products listed in full before the list is truncated.
pub const PRODUCT_LIST_CAP: usize = 20;

/// Order count and revenue in one time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub count: usize,
    pub revenue: Money,
}

impl Window {
    fn add(&mut self, amount: Money) {
        self.count += 1;
        self.revenue = self.revenue + amount;
    }
}

/// Orders bucketed into the windows the assistant reports on.
///
/// "Today" and "yesterday" are UTC calendar days; "this week" is the last
/// 7 days and "last week" the 7 days before that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderWindows {
    pub total: Window,
    pub today: Window,
    pub yesterday: Window,
    pub this_week: Window,
    pub last_week: Window,
    pub last_48h: Window,
}

impl OrderWindows {
    /// Bucket order points relative to `now`.
    #[must_use]
    pub fn from_points(points: &[OrderPoint], now: DateTime<Utc>) -> Self {
        let today_start = start_of_day(now);
        let yesterday_start = today_start - Duration::days(1);
        let week_start = now - Duration::days(7);
        let last_week_start = now - Duration::days(14);
        let last_48h = now - Duration::hours(48);

        let mut windows = Self::default();
        for point in points {
            let at = point.created_at;
            let amount = point.total_amount;

            windows.total.add(amount);
            if at >= today_start {
                windows.today.add(amount);
            }
            if at >= yesterday_start && at < today_start {
                windows.yesterday.add(amount);
            }
            if at >= week_start {
                windows.this_week.add(amount);
            }
            if at >= last_week_start && at < week_start {
                windows.last_week.add(amount);
            }
            if at >= last_48h {
                windows.last_48h.add(amount);
            }
        }
        windows
    }
}

/// Midnight UTC on the day of `now`.
#[must_use]
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}

/// Everything the snapshot and alerts need, read in one pass.
#[derive(Debug, Clone)]
pub struct BusinessMetrics {
    pub store_name: String,
    pub niche: String,
    pub total_products: i64,
    /// The newest products, at most [`PRODUCT_LIST_CAP`].
    pub products: Vec<Product>,
    /// Products with `0 < stock < LOW_STOCK_THRESHOLD`, lowest first.
    pub low_stock: Vec<Product>,
    /// Products with `stock <= 0`.
    pub out_of_stock: Vec<Product>,
    pub orders: OrderWindows,
    pub last_order: Option<Order>,
    pub total_customers: i64,
    pub new_customers_this_week: i64,
    pub last_customer: Option<Customer>,
    pub pending_shipments: i64,
}

impl BusinessMetrics {
    /// Read a tenant's metrics as of `now`.
    ///
    /// # Errors
    ///
    /// Returns the first repository error encountered.
    #[instrument(skip(pool), fields(user_id = ?tenant))]
    pub async fn collect(
        pool: &SqlitePool,
        tenant: Option<&TenantId>,
        now: DateTime<Utc>,
    ) -> Result<Self, RepositoryError> {
        let products = ProductRepository::new(pool, tenant);
        let orders = OrderRepository::new(pool, tenant);
        let customers = CustomerRepository::new(pool, tenant);

        let settings = match tenant {
            Some(_) => StoreSettingsRepository::new(pool).find(tenant).await?,
            None => None,
        };
        let (store_name, niche) = settings.as_ref().map_or_else(
            || (DEFAULT_STORE_NAME.to_owned(), DEFAULT_NICHE.to_owned()),
            |s| (s.store_name_or_default().to_owned(), s.niche_or_default().to_owned()),
        );

        let (low_stock, out_of_stock): (Vec<Product>, Vec<Product>) = products
            .low_stock(LOW_STOCK_THRESHOLD)
            .await?
            .into_iter()
            .partition(|p| p.stock_level().is_low());

        Ok(Self {
            store_name,
            niche,
            total_products: products.count().await?,
            products: products.list(PRODUCT_LIST_CAP as i64).await?,
            low_stock,
            out_of_stock,
            orders: OrderWindows::from_points(&orders.timeline().await?, now),
            last_order: orders.latest().await?,
            total_customers: customers.count().await?,
            new_customers_this_week: customers.count_since(now - Duration::days(7)).await?,
            last_customer: customers.latest().await?,
            pending_shipments: ShipmentRepository::new(pool, tenant).count_pending().await?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn point(amount: &str, at: DateTime<Utc>) -> OrderPoint {
        OrderPoint {
            total_amount: Money::parse(amount).unwrap(),
            created_at: at,
        }
    }

    #[test]
    fn test_start_of_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 15, 30, 0).unwrap();
        assert_eq!(start_of_day(now), Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_order_windows_bucket_by_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let points = [
            point("100", now - Duration::hours(1)),
            point("200", now - Duration::hours(20)),
            point("300", now - Duration::days(3)),
            point("400", now - Duration::days(10)),
            point("500", now - Duration::days(30)),
        ];
        let windows = OrderWindows::from_points(&points, now);

        assert_eq!(windows.total.count, 5);
        assert_eq!(windows.total.revenue, Money::parse("1500").unwrap());
        assert_eq!(windows.today.count, 1);
        assert_eq!(windows.yesterday.count, 1);
        assert_eq!(windows.yesterday.revenue, Money::parse("200").unwrap());
        assert_eq!(windows.this_week.count, 3);
        assert_eq!(windows.last_week.count, 1);
        assert_eq!(windows.last_week.revenue, Money::parse("400").unwrap());
        assert_eq!(windows.last_48h.count, 2);
    }
}
