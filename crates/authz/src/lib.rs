//! Authorization guard for catalog mutation endpoints.
//!
//! The storefront has no user accounts; the only protected surface is
//! catalog management, gated by a single admin bearer token from
//! settings. When no token is configured the mutations refuse requests
//! instead of falling open.

use axum::http::{header, HeaderMap};
use thiserror::Error;

use bookmart_kernel::settings::AuthSettings;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthzError {
    #[error("admin token is not configured; catalog mutations are disabled")]
    NotConfigured,

    #[error("missing or malformed Authorization header")]
    MissingCredentials,

    #[error("invalid admin token")]
    InvalidToken,
}

/// Check the request's bearer token against the configured admin token.
pub fn require_admin(headers: &HeaderMap, auth: &AuthSettings) -> Result<(), AuthzError> {
    let Some(expected) = auth.admin_token.as_deref() else {
        return Err(AuthzError::NotConfigured);
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthzError::MissingCredentials)?;

    if provided != expected {
        tracing::warn!("rejected catalog mutation with invalid admin token");
        return Err(AuthzError::InvalidToken);
    }

    Ok(())
}
