//! User management HTTP handlers

use crate::{
    auth::gate::AuthContext, error::AppError, middleware::AppState,
    models::query::ListUsersParams,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// List users. The admin gate has already run; the handler only executes
/// the validated listing query.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(params): Query<ListUsersParams>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(requested_by = %auth_context.user_id, "Listing users");

    let response = state.auth_service.list_users(params).await?;

    Ok(Json(response))
}

/// Fetch one user by id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(requested_by = %auth_context.user_id, user_id = %id, "Fetching user");

    let user = state.auth_service.get_user(id).await?;

    Ok(Json(user))
}
