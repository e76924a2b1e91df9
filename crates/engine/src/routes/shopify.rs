//! Shopify connection, sync, and webhook endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mona_core::StoreId;

use super::optional_tenant;
use crate::connectors::shopify::{PLATFORM, WEBHOOK_HMAC_HEADER, store_name_from_url};
use crate::connectors::{ConnectorError, ShopifyClient, sync_store, verify_webhook};
use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::state::AppState;

const TOPIC_HEADER: &str = "X-Shopify-Topic";

/// Build the Shopify router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect/shopify", post(connect))
        .route("/sync/{store_id}", get(sync))
        .route("/webhook/shopify", post(webhook))
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub shop_url: String,
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub status: &'static str,
    pub store_id: StoreId,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub status: &'static str,
    pub products_synced: usize,
    pub orders_synced: usize,
    pub products_created: usize,
    pub orders_created: usize,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

/// Register a Shopify store, or refresh the token of an existing one.
///
/// # Errors
///
/// Returns 400 for an unusable URL or token, or 500 if the write fails.
#[instrument(skip_all, fields(shop_url = %body.shop_url))]
pub async fn connect(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Json(body): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>> {
    let token = body.access_token.trim();
    if token.is_empty() {
        return Err(ConnectorError::MissingToken.into());
    }
    let tenant = optional_tenant(body.user_id.as_deref())?;

    // Validates the URL and token before anything is stored
    ShopifyClient::new(
        &body.shop_url,
        &SecretString::from(token.to_owned()),
        &state.config().shopify.api_version,
    )?;

    let store_url = body.shop_url.trim();
    let store = StoreRepository::new(state.pool())
        .connect(
            tenant.as_ref(),
            &store_name_from_url(store_url),
            PLATFORM,
            store_url,
            token,
        )
        .await?;

    tracing::info!(store_id = %store.id, "Shopify store connected");
    Ok(Json(ConnectResponse {
        status: "connected",
        store_id: store.id,
    }))
}

/// Pull products and orders from a connected store.
///
/// # Errors
///
/// Returns 404 for an unknown store, 400 if it has no token, 502 if Shopify
/// fails, or 500 if the local writes fail.
#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn sync(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<SyncResponse>> {
    let store = StoreRepository::new(state.pool())
        .find_by_id(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;
    let token = store
        .access_token
        .clone()
        .ok_or(ConnectorError::MissingToken)?;

    let client = ShopifyClient::new(
        &store.store_url,
        &SecretString::from(token),
        &state.config().shopify.api_version,
    )?;
    let report = sync_store(state.pool(), &store, &client).await?;

    Ok(Json(SyncResponse {
        status: "success",
        products_synced: report.products_synced,
        orders_synced: report.orders_synced,
        products_created: report.products_created,
        orders_created: report.orders_created,
    }))
}

/// Acknowledge a Shopify webhook.
///
/// Shopify cannot send `X-API-Key`, so this route is authenticated by the
/// body signature alone, checked whenever a webhook secret is configured.
///
/// # Errors
///
/// Returns 401 if the signature is missing or wrong.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    if let Some(secret) = &state.config().shopify.webhook_secret {
        let signature = headers
            .get(WEBHOOK_HMAC_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ConnectorError::InvalidSignature)?;
        verify_webhook(secret, &body, signature)?;
    }

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info!(topic, bytes = body.len(), "Shopify webhook received");

    Ok(Json(WebhookResponse { status: "received" }))
}
