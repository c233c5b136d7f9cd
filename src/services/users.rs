//! User management: reads, partial profile updates and soft deletion.
//! Callers are responsible for authorization.

use std::sync::Arc;

use tracing::info;

use crate::error::AppResult;
use crate::models::{User, UserChanges};
use crate::repositories::UserRepository;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.users.find_by_id(id).await
    }

    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    /// Profile of the authenticated caller.
    pub async fn get_current(&self, id: i64) -> AppResult<User> {
        self.users.find_by_id(id).await
    }

    pub async fn get_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        self.users.find_by_role(role).await
    }

    /// Apply only the fields present in `changes`; everything else is kept.
    pub async fn update(&self, id: i64, changes: UserChanges) -> AppResult<User> {
        let mut user = self.users.find_by_id(id).await?;
        if changes.is_empty() {
            return Ok(user);
        }
        changes.apply(&mut user);
        let user = self.users.update(&user).await?;
        info!(user_id = id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.users.find_by_id(id).await?;
        self.users.delete(id).await?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}
