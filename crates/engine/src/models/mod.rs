//! Domain models for merchant data.

pub mod customer;
pub mod order;
pub mod product;
pub mod store;
pub mod store_settings;

pub use customer::{Customer, NewCustomer};
pub use order::{NewOrder, Order};
pub use product::{NewProduct, Product, ProductUpdate};
pub use store::Store;
pub use store_settings::{DEFAULT_NICHE, DEFAULT_STORE_NAME, StoreSettings, StoreSettingsUpdate};
