//! CSV import endpoint.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::optional_tenant;
use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::services::{IngestKind, ingest_csv};
use crate::state::AppState;

/// Build the ingest router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ingest-csv", post(ingest))
}

#[derive(Debug, Deserialize)]
pub struct IngestQuery {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub imported_count: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Import products or customers from a CSV body.
///
/// # Errors
///
/// Returns 400 for an unknown `type`, an empty body, or a CSV missing a
/// required column; 500 if the import write fails.
#[instrument(skip_all, fields(kind = %query.kind, user_id = ?query.user_id))]
pub async fn ingest(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(query): Query<IngestQuery>,
    body: Bytes,
) -> Result<Json<IngestResponse>> {
    let kind: IngestKind = query.kind.parse()?;
    let tenant = optional_tenant(query.user_id.as_deref())?;
    if body.is_empty() {
        return Err(AppError::BadRequest("CSV body is empty".to_string()));
    }

    let imported_count = ingest_csv(state.pool(), tenant.as_ref(), kind, &body).await?;
    Ok(Json(IngestResponse {
        status: "success",
        imported_count,
        kind: kind.as_str(),
    }))
}
