//! Business services for the engine.
//!
//! - `creative` - brand, storefront copy, and document generation
//! - `extraction` - product lists from free text
//! - `ingest` - CSV imports
//! - `notifications` - per-tenant alert queue and background poller

pub mod creative;
pub mod extraction;
pub mod ingest;
pub mod notifications;

pub use creative::{
    BrandIdentity, StorefrontCopy, describe_product, design_brand, draft_document,
    write_storefront_copy,
};
pub use extraction::extract_products;
pub use ingest::{IngestError, IngestKind, ingest_csv};
pub use notifications::{NotificationService, fresh_alerts};
