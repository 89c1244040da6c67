//! Collective backend.
//!
//! REST API for the events site and its back office, with SQLite persistence, plus
//! the client-side puzzle gating state used by the site's hidden pages.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use db::{Repository, SubscriberStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub subscribers: Arc<SubscriberStore>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the signing secret for the auth layer
    let secret = state.config.admin_secret.clone();

    // Admin routes behind the bearer token
    let protected_routes = Router::new()
        .route(
            "/events",
            get(api::list_events)
                .post(api::save_event)
                .delete(api::delete_event),
        )
        .route("/subscribers", get(api::list_subscribers))
        .route("/subscribers/{id}", delete(api::delete_subscriber))
        .route("/rsvps", get(api::admin_list_rsvps))
        .route("/rsvps/{id}", patch(api::update_rsvp_status))
        .route(
            "/upload",
            post(api::upload_image).layer(DefaultBodyLimit::max(api::MAX_UPLOAD_BYTES)),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(secret.clone(), req, next)
        }));

    // Login stays outside the auth layer
    let admin_routes = Router::new()
        .route("/auth", post(api::login))
        .merge(protected_routes);

    let api_routes = Router::new()
        .route("/events", get(api::list_events))
        .route(
            "/events/rsvp",
            get(api::lookup_rsvps).post(api::create_rsvp),
        )
        .route("/events/{slug}", get(api::get_event))
        .route("/subscribe", post(api::subscribe))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .nest_service(
            api::UPLOADS_URL_PREFIX,
            ServeDir::new(&state.config.upload_dir),
        )
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
