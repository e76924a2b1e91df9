//! Mona Core - Shared types library.
//!
//! This crate provides common types used across all Mona components:
//! - `engine` - HTTP backend, assistant, data access and notifications
//! - `cli` - Command-line tools for migrations, seeding and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, tenants, money, stock and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
