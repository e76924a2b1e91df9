//! Shared-secret API key authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Extractor that requires a valid `X-API-Key` header.
///
/// Rejects with 500 when the server has no key configured and 403 when the
/// presented key is missing or wrong.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected(_auth: RequireApiKey) -> &'static str {
///     "ok"
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let expected = state
            .config()
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::Misconfigured("MIA_API_KEY not set".to_string()))?;

        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if keys_match(expected.expose_secret(), presented) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected request with invalid API key");
            Err(AppError::Forbidden("Invalid API key".to_string()))
        }
    }
}

/// Constant-time comparison of the configured and presented keys.
fn keys_match(expected: &str, presented: &str) -> bool {
    if expected.len() != presented.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in expected.bytes().zip(presented.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
