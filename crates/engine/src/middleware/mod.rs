//! HTTP middleware for the engine.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry (`NewSentryLayer`, `SentryHttpLayer`)
//! 2. `TraceLayer` (method, uri, status, latency)
//! 3. CORS
//!
//! Authentication is an extractor, [`auth::RequireApiKey`], added to every
//! handler that needs it rather than a layer, so health probes stay open.

pub mod auth;

pub use auth::RequireApiKey;
