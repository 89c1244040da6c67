//! Event API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{DeleteEventRequest, Event, SaveEventRequest};
use crate::AppState;

/// GET /api/events and GET /api/admin/events - List all events.
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    success(state.repo.list_events().await?)
}

/// GET /api/events/{slug} - Get a single event.
pub async fn get_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Event> {
    match state.repo.get_event_by_slug(&slug).await? {
        Some(event) => success(event),
        None => Err(AppError::NotFound(format!("Event {} not found", slug))),
    }
}

/// POST /api/admin/events - Create an event, or update it when `id` is set.
pub async fn save_event(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SaveEventRequest>,
) -> ApiResult<Event> {
    let request = request.normalized();

    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let event = match request.id {
        Some(id) => state.repo.update_event(id, &request).await?,
        None => state.repo.create_event(&request).await?,
    };

    tracing::info!(
        id = event.id,
        slug = %event.slug,
        created = request.id.is_none(),
        "Saved event"
    );
    success(event)
}

/// DELETE /api/admin/events - Delete the event named by `{slug}` in the body.
pub async fn delete_event(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteEventRequest>,
) -> ApiResult<()> {
    let slug = request.slug.trim();
    if slug.is_empty() {
        return Err(AppError::Validation("Slug is required".to_string()));
    }

    state.repo.delete_event_by_slug(slug).await?;
    tracing::info!(slug = %slug, "Deleted event");
    success(())
}
