//! Content generation endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::services::describe_product;
use crate::state::AppState;

/// Build the content router.
pub fn router() -> Router<AppState> {
    Router::new().route("/generate-description", post(generate_description))
}

#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

/// Write a product description. Falls back to a stock line when the model
/// is unavailable.
///
/// # Errors
///
/// Returns 400 if `name` is empty.
pub async fn generate_description(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Json(body): Json<DescriptionRequest>,
) -> Result<Json<DescriptionResponse>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let description = describe_product(
        state.llm(),
        name,
        body.category.as_deref(),
        body.features.as_deref(),
    )
    .await;
    Ok(Json(DescriptionResponse { description }))
}
