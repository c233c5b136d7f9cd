//! In-memory user store. Same contract as the Postgres store; used by tests
//! and for running the API without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{email_taken, user_not_found, UserRepository};
use crate::error::AppResult;
use crate::models::{normalize_email, NewUser, User};

#[derive(Default)]
struct Inner {
    last_id: i64,
    /// Tombstoned rows stay here; ids are never handed out twice.
    users: BTreeMap<i64, User>,
}

impl Inner {
    fn active(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| !u.is_deleted())
    }

    fn email_in_use(&self, email: &str, except: Option<i64>) -> bool {
        self.active()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let email = normalize_email(&user.email);
        let mut inner = self.inner.write().await;
        if inner.email_in_use(&email, None) {
            return Err(email_taken());
        }

        inner.last_id += 1;
        let now = Utc::now();
        let row = User {
            id: inner.last_id,
            email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&id)
            .filter(|u| !u.is_deleted())
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let inner = self.inner.read().await;
        let found = inner.active().find(|u| u.email == email).cloned();
        found.ok_or_else(user_not_found)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.active().cloned().collect())
    }

    async fn find_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.active().filter(|u| u.role == role).cloned().collect())
    }

    async fn count(&self) -> AppResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.active().count() as i64)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let email = normalize_email(&user.email);
        let mut inner = self.inner.write().await;
        let active = inner.users.get(&user.id).is_some_and(|u| !u.is_deleted());
        if !active {
            return Err(user_not_found());
        }
        if inner.email_in_use(&email, Some(user.id)) {
            return Err(email_taken());
        }
        let row = inner
            .users
            .get_mut(&user.id)
            .filter(|u| !u.is_deleted())
            .ok_or_else(user_not_found)?;

        row.email = email;
        row.name = user.name.clone();
        row.password_hash = user.password_hash.clone();
        row.role = user.role.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let row = inner
            .users
            .get_mut(&id)
            .filter(|u| !u.is_deleted())
            .ok_or_else(user_not_found)?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }
}
