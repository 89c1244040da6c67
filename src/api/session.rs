//! Admin login endpoint.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::{success, ApiJson, ApiResult};
use crate::auth;
use crate::errors::AppError;
use crate::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
}

/// POST /api/admin/auth - Exchange the admin password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let Some(expected) = state.config.admin_password.as_deref() else {
        tracing::warn!("Admin login attempted but no admin password is configured");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    };

    if !auth::check_password(expected, &request.password) {
        tracing::warn!("Rejected admin login with wrong password");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let Some(secret) = state.config.admin_secret.as_deref() else {
        tracing::error!("Admin login succeeded but no signing secret is configured");
        return Err(AppError::Internal(
            "Admin authentication is not configured".to_string(),
        ));
    };

    let issued = auth::issue_token(secret, auth::now_millis())?;
    tracing::info!(expires_at = issued.expires_at, "Issued admin token");

    success(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    })
}
