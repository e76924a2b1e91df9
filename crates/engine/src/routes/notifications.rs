//! Notification, briefing, and snapshot endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use super::path_tenant;
use crate::error::Result;
use crate::intelligence::{Alert, build_snapshot, morning_briefing};
use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications/{user_id}", get(notifications))
        .route("/morning-briefing/{user_id}", get(briefing))
        .route("/api/intelligence/{user_id}", get(intelligence))
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Alert>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BriefingResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub snapshot: String,
}

/// Drain queued alerts for a tenant, merged with freshly computed ones.
///
/// # Errors
///
/// Returns 400 if `user_id` is invalid.
pub async fn notifications(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<NotificationsResponse>> {
    let tenant = path_tenant(&user_id)?;
    let notifications = state.notifications().fetch(state.pool(), &tenant).await;

    Ok(Json(NotificationsResponse {
        count: notifications.len(),
        notifications,
    }))
}

/// Morning briefing for a tenant.
///
/// # Errors
///
/// Returns 400 if `user_id` is invalid.
pub async fn briefing(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BriefingResponse>> {
    let tenant = path_tenant(&user_id)?;
    let message = morning_briefing(state.pool(), Some(&tenant)).await;
    Ok(Json(BriefingResponse { message }))
}

/// The same snapshot the assistant reasons over.
///
/// # Errors
///
/// Returns 400 if `user_id` is invalid.
pub async fn intelligence(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SnapshotResponse>> {
    let tenant = path_tenant(&user_id)?;
    let snapshot = build_snapshot(state.pool(), Some(&tenant)).await;
    Ok(Json(SnapshotResponse { snapshot }))
}
