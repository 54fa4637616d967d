//! Shared API plumbing: the error type and the unauthenticated endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// API error type mapping to HTTP status codes.
///
/// Every variant renders as a JSON body of the form `{"error": message}`.
/// `Internal` carries the fault detail for the log only; the response body
/// stays generic.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Maps an [`AccountError`](stead_accounts::AccountError) to the API error
/// contract.
pub(crate) fn account_err(e: stead_accounts::AccountError) -> ApiError {
    match e {
        stead_accounts::AccountError::NotFound => ApiError::NotFound("user not found".to_string()),
        stead_accounts::AccountError::InvalidDateOfBirth => ApiError::BadRequest(e.to_string()),
        stead_accounts::AccountError::Database(_) => ApiError::Internal(e.to_string()),
    }
}

/// Maps a [`ListingError`](stead_listings::ListingError) to the API error
/// contract.
pub(crate) fn listing_err(e: stead_listings::ListingError) -> ApiError {
    match e {
        stead_listings::ListingError::NotFound => {
            ApiError::NotFound("property not found".to_string())
        }
        stead_listings::ListingError::OwnerMissing => {
            ApiError::BadRequest("owner user not found".to_string())
        }
        stead_listings::ListingError::Database(_) => ApiError::Internal(e.to_string()),
    }
}

/// Service banner at `/`.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "service": "stead",
        "status": "ok"
    }))
}

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load balancers,
/// monitoring, and CI to verify the server is running.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fallback for unknown routes.
pub async fn fallback_handler() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
