//! Auth HTTP handlers: register, login, me.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppError;
use crate::handlers::extract::ValidatedJson;
use crate::handlers::http::AppState;
use crate::middleware::CurrentUser;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = state.auth_service().register(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth_service().login(body).await?;
    Ok(Json(response))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<User>, AppError> {
    let user = state.user_service().get_current(identity.user_id).await?;
    Ok(Json(user))
}
