//! Postgres user store. Uniqueness of active emails is enforced by the
//! partial index `users_email_active_key`.

use async_trait::async_trait;

use super::{email_taken, user_not_found, UserRepository};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{normalize_email, NewUser, User};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, role, created_at, updated_at, deleted_at";

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            email_taken()
        }
        _ => AppError::Db(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) WHERE deleted_at IS NULL DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(normalize_email(&user.email))
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        row.ok_or_else(email_taken)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(user_not_found)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(user_not_found)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 AND deleted_at IS NULL ORDER BY id"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*)::bigint FROM users WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2, name = $3, password_hash = $4, role = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(normalize_email(&user.email))
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        row.ok_or_else(user_not_found)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let r = sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if r.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }
}
