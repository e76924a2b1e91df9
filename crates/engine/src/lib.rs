//! Mona engine library.
//!
//! The merchant back-office behind the Mona chat assistant: store data
//! access, the function-calling assistant, business intelligence,
//! background notifications, and commerce platform connectors. The
//! `mona-engine` binary serves it over HTTP.
//!
//! # Security
//!
//! Every route except the health checks and the Shopify webhook requires the
//! shared `X-API-Key`; the webhook is verified by its HMAC signature. Data is
//! scoped per merchant by `user_id`; requests without one are unscoped.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assistant;
pub mod config;
pub mod connectors;
pub mod db;
pub mod error;
pub mod intelligence;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
