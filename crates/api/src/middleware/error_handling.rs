//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON bodies, so every handler
//! reports failures the same way.
//!
//! | Error | Status | Body |
//! |---|---|---|
//! | `Validation` | 400 | field → messages map |
//! | `NotFound` | 404 | `{"error": "Not found"}` |
//! | `Conflict` | 409 | `{"error": <message>}` |
//! | `Database`, `Internal` | 500 | `{"error": "An unexpected error occurred"}` |
//!
//! Details of unexpected errors are logged, never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mfc_core::errors::MfcError;
use serde_json::json;
use tracing::error;

pub const NOT_FOUND_MESSAGE: &str = "Not found";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use mfc_api::middleware::error_handling::AppError;
/// use mfc_core::errors::MfcError;
///
/// async fn handler(name: String) -> Result<Json<String>, AppError> {
///     if name.is_empty() {
///         return Err(MfcError::validation("name", "Name is required").into());
///     }
///     Ok(Json(name))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub MfcError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            MfcError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            MfcError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": NOT_FOUND_MESSAGE })),
            )
                .into_response(),
            MfcError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            err @ (MfcError::Database(_) | MfcError::Internal(_)) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": UNEXPECTED_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

/// Allows `?` on `MfcResult` inside handlers.
impl From<MfcError> for AppError {
    fn from(err: MfcError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(MfcError::Database(err))
    }
}

/// Maps an MfcError straight to an HTTP response.
pub fn map_error(err: MfcError) -> Response {
    AppError(err).into_response()
}
