//! RSVP API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiJson, ApiResult};
use crate::auth;
use crate::db::NewRsvp;
use crate::errors::AppError;
use crate::models::{
    clamp_guests, is_valid_email, normalize_email, CreateRsvpRequest, Rsvp, RsvpSummary,
    UpdateRsvpStatusRequest,
};
use crate::AppState;

/// Query parameters for the public RSVP lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpLookupQuery {
    #[serde(default)]
    pub event_slug: Option<String>,
    /// Dump every RSVP; requires an admin bearer token
    #[serde(default)]
    pub debug: bool,
}

/// Either a public headcount or, in debug mode, the full list.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RsvpLookup {
    Summary(RsvpSummary),
    All(Vec<Rsvp>),
}

/// Query parameters for the admin RSVP lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRsvpQuery {
    /// Event slug or numeric id
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub all: bool,
}

/// POST /api/events/rsvp - RSVP for an event.
pub async fn create_rsvp(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRsvpRequest>,
) -> ApiResult<Rsvp> {
    let event_slug = request.event_slug.trim();
    let name = request.name.trim();
    let email = normalize_email(&request.email);

    if event_slug.is_empty() || name.is_empty() || email.is_empty() {
        return Err(AppError::Validation(
            "Event, name and email are required".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let event = state
        .repo
        .get_event_by_slug(event_slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_slug)))?;

    if !event.tickets_available {
        return Err(AppError::Validation(
            "RSVPs are not available for this event".to_string(),
        ));
    }

    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let rsvp = state
        .repo
        .create_rsvp(&NewRsvp {
            event_id: event.id,
            name: name.to_string(),
            email,
            guests: clamp_guests(request.guests),
            notes,
        })
        .await?;

    tracing::info!(event = %event.slug, guests = rsvp.guests, "Recorded RSVP");
    success(rsvp)
}

/// GET /api/events/rsvp - Headcount for `eventSlug`, or every RSVP with `debug=true`.
pub async fn lookup_rsvps(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RsvpLookupQuery>,
) -> ApiResult<RsvpLookup> {
    if query.debug {
        auth::verify_bearer(
            &headers,
            state.config.admin_secret.as_deref(),
            auth::now_millis(),
        )
        .map_err(|reason| {
            tracing::debug!(reason = ?reason, "Rejected RSVP debug listing");
            AppError::Unauthorized(reason.to_string())
        })?;

        return success(RsvpLookup::All(state.repo.list_rsvps(None).await?));
    }

    let Some(slug) = query.event_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(AppError::Validation("eventSlug is required".to_string()));
    };

    let event = state
        .repo
        .get_event_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", slug)))?;

    success(RsvpLookup::Summary(state.repo.rsvp_summary(&event).await?))
}

/// GET /api/admin/rsvps - RSVPs for `eventId`, or all of them with `all=true`.
pub async fn admin_list_rsvps(
    State(state): State<AppState>,
    Query(query): Query<AdminRsvpQuery>,
) -> ApiResult<Vec<Rsvp>> {
    if query.all {
        return success(state.repo.list_rsvps(None).await?);
    }

    let Some(key) = query.event_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(AppError::Validation(
            "eventId or all=true is required".to_string(),
        ));
    };

    let event = state
        .repo
        .find_event(key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", key)))?;

    success(state.repo.list_rsvps(Some(event.id)).await?)
}

/// PATCH /api/admin/rsvps/{id} - Change an RSVP's status.
pub async fn update_rsvp_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateRsvpStatusRequest>,
) -> ApiResult<Rsvp> {
    let rsvp = state.repo.update_rsvp_status(id, request.status).await?;
    tracing::info!(id, status = rsvp.status.as_str(), "Updated RSVP status");
    success(rsvp)
}
