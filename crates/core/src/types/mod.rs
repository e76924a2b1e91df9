//! Core types for Mona.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;
pub mod stock;
pub mod tenant;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use status::*;
pub use stock::{LOW_STOCK_THRESHOLD, StockLevel};
pub use tenant::{TenantId, TenantIdError};
