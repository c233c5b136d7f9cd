//! Shared application state and the health probe.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::{AuthService, TokenCodec};
use crate::config::SERVICE_NAME;
use crate::repositories::UserRepository;
use crate::services::UserService;

/// Shared application state for all handlers and gates.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub tokens: TokenCodec,
}

impl AppState {
    /// Wire both services over one user store.
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenCodec) -> Self {
        Self {
            auth_service: AuthService::new(users.clone(), tokens.clone()),
            user_service: UserService::new(users),
            tokens,
        }
    }

    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }
    pub fn user_service(&self) -> &UserService {
        &self.user_service
    }
    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": SERVICE_NAME })),
    )
}
