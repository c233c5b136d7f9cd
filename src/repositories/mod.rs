//! User persistence contract and its implementations.
//!
//! Every read goes through the active view: rows with a `deleted_at`
//! tombstone are invisible to all operations. Emails are stored and
//! compared in their normalised (trimmed, lowercase) form.

mod memory;
mod postgres;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, assigning id and timestamps. Fails with `Conflict`
    /// when an active user already holds the email; the check and insert
    /// are a single atomic step.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: i64) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<User>;

    /// All active users ordered by id.
    async fn find_all(&self) -> AppResult<Vec<User>>;

    async fn find_by_role(&self, role: &str) -> AppResult<Vec<User>>;

    async fn count(&self) -> AppResult<i64>;

    /// Overwrite email, name, password hash and role of an active user and
    /// bump `updated_at`. `NotFound` if the id is not active, `Conflict` if
    /// the new email belongs to another active user.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Set the tombstone. `NotFound` covers never-existed and already-deleted.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("user not found".to_string())
}

pub(crate) fn email_taken() -> AppError {
    AppError::Conflict("user with this email already exists".to_string())
}
