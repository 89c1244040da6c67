//! Admin token authentication.
//!
//! Tokens have the form `<hex hmac-sha256>.<expiry epoch millis>`, signed over
//! `admin-access-<expiry>` with the configured secret. Every admin route goes through
//! [`verify_bearer`], either via [`admin_auth_layer`] or directly from a handler.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime: 24 hours.
pub const TOKEN_TTL_MS: i64 = 24 * 60 * 60 * 1000;

const TOKEN_MESSAGE_PREFIX: &str = "admin-access-";

/// A freshly issued admin token.
#[derive(Debug, Clone)]
pub struct AdminToken {
    pub token: String,
    pub expires_at: i64,
}

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token expiry")]
    InvalidExpiry,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token signature")]
    BadSignature,
}

/// Why a request was refused admin access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("Missing bearer token")]
    MissingHeader,
    #[error("Admin authentication is not configured")]
    NotConfigured,
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn sign(secret: &str, expires_at: i64) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(format!("{TOKEN_MESSAGE_PREFIX}{expires_at}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Issue a token valid for [`TOKEN_TTL_MS`] from `now_ms`.
pub fn issue_token(secret: &str, now_ms: i64) -> Result<AdminToken, AppError> {
    let expires_at = now_ms + TOKEN_TTL_MS;
    let signature = sign(secret, expires_at)
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))?;

    Ok(AdminToken {
        token: format!("{signature}.{expires_at}"),
        expires_at,
    })
}

/// Verify a token against the secret at time `now_ms`.
pub fn verify_token(secret: &str, token: &str, now_ms: i64) -> Result<(), TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [signature, expiry] = parts.as_slice() else {
        return Err(TokenError::Malformed);
    };

    let expires_at: i64 = expiry.parse().map_err(|_| TokenError::InvalidExpiry)?;
    if expires_at < now_ms {
        return Err(TokenError::Expired);
    }

    let expected = sign(secret, expires_at).map_err(|_| TokenError::BadSignature)?;
    if constant_time_compare(signature, &expected) {
        Ok(())
    } else {
        Err(TokenError::BadSignature)
    }
}

/// Verify the `Authorization: Bearer <token>` header of a request.
pub fn verify_bearer(
    headers: &HeaderMap,
    secret: Option<&str>,
    now_ms: i64,
) -> Result<(), AuthFailure> {
    let secret = secret.ok_or(AuthFailure::NotConfigured)?;

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthFailure::MissingHeader)?;

    verify_token(secret, token, now_ms)?;
    Ok(())
}

/// Check the login password against the configured one.
pub fn check_password(expected: &str, provided: &str) -> bool {
    constant_time_compare(provided, expected)
}

/// Admin authentication layer; takes the signing secret as a parameter.
pub async fn admin_auth_layer(secret: Option<String>, request: Request, next: Next) -> Response {
    match verify_bearer(request.headers(), secret.as_deref(), now_millis()) {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::debug!(
                path = %request.uri().path(),
                reason = ?reason,
                "Rejected admin request"
            );
            AppError::Unauthorized(reason.to_string()).into_response()
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
