//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Responses are JSON
//! `{"error": "..."}`; server-side failures are captured to Sentry and their
//! details are never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::connectors::ConnectorError;
use crate::db::RepositoryError;
use crate::services::IngestError;

/// Application-level error type for the engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Commerce platform operation failed.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// CSV import failed.
    #[error("Import error: {0}")]
    Ingest(#[from] IngestError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller presented an invalid credential.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// The server is missing required configuration.
    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Connector(err) => match err {
                ConnectorError::InvalidUrl(_) | ConnectorError::MissingToken => {
                    StatusCode::BAD_REQUEST
                }
                ConnectorError::InvalidSignature => StatusCode::UNAUTHORIZED,
                ConnectorError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ConnectorError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ConnectorError::Http(_) | ConnectorError::Api { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Ingest(IngestError::Repository(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ingest(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(_)) => {
                "A record with these details already exists".to_string()
            }
            Self::Database(_) | Self::Ingest(IngestError::Repository(_)) => {
                "Internal server error".to_string()
            }
            Self::Connector(ConnectorError::Repository(_)) => "Internal server error".to_string(),
            Self::Connector(ConnectorError::Http(_) | ConnectorError::Api { .. }) => {
                "External service error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
