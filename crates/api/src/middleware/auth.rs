//! # Caller Identity Middleware
//!
//! Authentication itself (token issuance and verification) lives in the
//! upstream gateway; by the time a request reaches this API, the gateway has
//! verified the caller and forwarded the identity as trusted headers. This
//! module extracts that identity and makes it available to handlers as a
//! request extension.
//!
//! ## Forwarded Headers
//!
//! - `x-auth-email`: verified email of the caller (required)
//! - `x-auth-given-name`: first name, if the identity provider supplies one
//! - `x-auth-family-name`: last name, if the identity provider supplies one
//!
//! A request without a verified email is rejected with 401 before any
//! handler runs. Customer identity is never read from the request body.

use autocrm_core::{errors::CrmError, models::customer::CustomerIdentity};
use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::middleware::error_handling::AppError;

/// Header carrying the verified caller email.
pub const AUTH_EMAIL_HEADER: &str = "x-auth-email";
/// Header carrying the caller's first name, when known.
pub const AUTH_GIVEN_NAME_HEADER: &str = "x-auth-given-name";
/// Header carrying the caller's last name, when known.
pub const AUTH_FAMILY_NAME_HEADER: &str = "x-auth-family-name";

/// Rejects requests without a verified caller identity and inserts the
/// extracted [`CustomerIdentity`] into request extensions for handlers.
pub async fn require_identity(mut request: Request, next: Next) -> Result<Response, AppError> {
    let identity = identity_from_headers(request.headers()).ok_or_else(|| {
        AppError(CrmError::Authentication(
            "Missing verified caller identity".to_string(),
        ))
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Builds a [`CustomerIdentity`] from the gateway-forwarded headers.
/// Returns `None` when no verified email is present.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<CustomerIdentity> {
    let email = header_value(headers, AUTH_EMAIL_HEADER)?;

    Some(CustomerIdentity {
        email,
        first_name: header_value(headers, AUTH_GIVEN_NAME_HEADER),
        last_name: header_value(headers, AUTH_FAMILY_NAME_HEADER),
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
