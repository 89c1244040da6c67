//! Subscriber API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{is_valid_email, normalize_email, SubscribeRequest, Subscriber};
use crate::AppState;

/// POST /api/subscribe - Join the mailing list.
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> ApiResult<Subscriber> {
    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let subscriber = state.subscribers.create(&email, name).await?;
    tracing::info!(id = %subscriber.id, "New subscriber");
    success(subscriber)
}

/// GET /api/admin/subscribers - List subscribers, newest first.
pub async fn list_subscribers(State(state): State<AppState>) -> ApiResult<Vec<Subscriber>> {
    success(state.subscribers.list().await?)
}

/// DELETE /api/admin/subscribers/{id} - Remove a subscriber.
pub async fn delete_subscriber(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.subscribers.delete(&id).await?;
    tracing::info!(id = %id, "Removed subscriber");
    success(())
}
