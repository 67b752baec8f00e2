//! Route registration
//! Builds the API router and applies middleware layers

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

use crate::{auth::gate, handlers, middleware::AppState};

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let codec = state.token_codec.clone();

    // Public endpoints (probes)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // Credential exchange: open by necessity
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    // Any authenticated caller
    let authenticated_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::get_current_user))
        .layer(axum::middleware::from_fn_with_state(
            codec.clone(),
            gate::require_authenticated,
        ));

    // Administrative callers only
    let admin_routes = Router::new()
        .route("/api/v1/users", get(handlers::user::list_users))
        .route("/api/v1/users/{id}", get(handlers::user::get_user))
        .layer(axum::middleware::from_fn_with_state(
            codec.clone(),
            gate::require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(
            crate::middleware::request_tracking_middleware,
        ))
        .with_state(state)
}
