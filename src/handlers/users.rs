//! User CRUD handlers. All routes here sit behind the authentication gate.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::extract::{JsonBody, UserIdPath};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::{MessageResponse, UpdateUserRequest, User, DEFAULT_ROLE};

/// GET /api/v1/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.user_service().get_all().await?;
    Ok(Json(users))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<User>, AppError> {
    let user = state.user_service().get(id).await?;
    Ok(Json(user))
}

/// PUT /api/v1/users/:id: partial update of name or email.
pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let changes = body.into_changes()?;
    let user = state.user_service().update(id, changes).await?;
    Ok(Json(user))
}

/// DELETE /api/v1/users/:id: soft delete.
pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<MessageResponse>, AppError> {
    state.user_service().delete(id).await?;
    Ok(Json(MessageResponse::new("user deleted")))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

/// GET /api/v1/admin/users?role=<role>. Admin only; role defaults to `user`.
pub async fn list_users_by_role(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let role = query
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE);
    let users = state.user_service().get_by_role(role).await?;
    Ok(Json(users))
}
