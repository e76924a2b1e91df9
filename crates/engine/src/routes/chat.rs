//! Chat endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tracing::instrument;

use super::optional_tenant;
use crate::assistant::{Assistant, ChatReply};
use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Answer one merchant message.
///
/// # Errors
///
/// Returns 400 for an empty message or invalid `user_id`. Model and action
/// failures surface as a canned reply, not an error.
#[instrument(skip_all, fields(user_id = ?body.user_id))]
pub async fn chat(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message cannot be empty".to_string()));
    }
    let tenant = optional_tenant(body.user_id.as_deref())?;

    let assistant = Assistant::new(state.pool(), state.llm(), state.notifications());
    Ok(Json(assistant.handle(message, tenant.as_ref()).await))
}
