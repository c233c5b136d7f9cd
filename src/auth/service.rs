//! Registration and login flows.

use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use super::jwt::TokenCodec;
use super::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, DEFAULT_ROLE};
use crate::repositories::UserRepository;

/// Digest checked when the email is unknown, so both failure paths pay for a hash.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("user-api-timing-guard").unwrap_or_default())
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenCodec) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Create an account with the default role and return a token for it.
    /// Input is expected to be validated already.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        match self.users.find_by_email(&req.email).await {
            Ok(_) => {
                warn!("registration rejected: email already in use");
                return Err(AppError::Conflict(
                    "user with this email already exists".to_string(),
                ));
            }
            Err(AppError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let password_hash = hash_password(&req.password)?;
        // The store re-checks uniqueness atomically; a concurrent registration
        // that slipped past the lookup above surfaces here as Conflict.
        let user = self
            .users
            .create(NewUser {
                email: req.email,
                name: req.name,
                password_hash,
                role: DEFAULT_ROLE.to_string(),
            })
            .await?;

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, "user registered");
        Ok(AuthResponse { token, user })
    }

    /// Check credentials and return a fresh token. Unknown email and wrong
    /// password fail identically.
    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        let user = match self.users.find_by_email(&req.email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                verify_password(&req.password, dummy_hash());
                warn!("login failed");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !verify_password(&req.password, &user.password_hash) {
            warn!(user_id = user.id, "login failed");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, "user logged in");
        Ok(AuthResponse { token, user })
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        self.tokens
            .issue(user.id, &user.email, &user.role)
            .map_err(|e| AppError::internal(format!("token: {}", e)))
    }
}
