//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the AutoCRM
//! API. It maps domain-specific errors to appropriate HTTP status codes and
//! JSON error responses, ensuring a consistent error handling experience
//! across the entire API.
//!
//! The implementation is based on Axum's error handling mechanisms and
//! integrates with AutoCRM's custom error types.

use autocrm_core::errors::CrmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `CrmError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub CrmError);

/// Converts application errors to HTTP responses
///
/// This implementation maps each error type to the appropriate HTTP status
/// code and formats the error message into a JSON response body. Storage and
/// other internal failures are reported with an opaque message; their detail
/// goes to the log, never to the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            CrmError::NotFound(_) => StatusCode::NOT_FOUND,
            CrmError::Validation(_) => StatusCode::BAD_REQUEST,
            CrmError::Authentication(_) => StatusCode::UNAUTHORIZED,
            CrmError::Authorization(_) => StatusCode::FORBIDDEN,
            CrmError::Conflict(_) => StatusCode::CONFLICT,
            CrmError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrmError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            CrmError::Database(_) | CrmError::Internal(_) => {
                tracing::error!("Internal error: {}", self.0);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message }));

        // Combine status code and JSON body into a response
        (status, body).into_response()
    }
}

/// Automatic conversion from CrmError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, CrmError>` in handler functions that return `Result<T, AppError>`.
impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, eyre::Report>` in handler functions that return
/// `Result<T, AppError>`. It wraps the eyre error in a CrmError::Database
/// variant.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(CrmError::Database(err))
    }
}

/// Maps a CrmError to an HTTP response
///
/// This function is provided for code that directly needs the error mapping
/// without going through a handler return type.
pub fn map_error(err: CrmError) -> Response {
    AppError(err).into_response()
}
