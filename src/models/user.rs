//! User record and the request/response shapes built around it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateEmail};

use crate::error::{AppError, AppResult};

/// Role given to every self-registered account.
pub const DEFAULT_ROLE: &str = "user";
/// Role allowed through the admin gate.
pub const ADMIN_ROLE: &str = "admin";

/// Persisted user. `password_hash` and `deleted_at` never leave the service.
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish_non_exhaustive()
    }
}

/// Fields needed to insert a user; the store assigns id and timestamps.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
    }
}

/// Canonical form used for every email comparison and write.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 6, max = 128, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Body of `PUT /users/:id`. Empty strings count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// Drop empty fields and validate the rest.
    pub fn into_changes(self) -> AppResult<UserChanges> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());

        if let Some(name) = &name {
            if name.chars().count() > 255 {
                return Err(AppError::Validation("name is too long".to_string()));
            }
        }
        if let Some(email) = &email {
            if !email.validate_email() {
                return Err(AppError::Validation("invalid email".to_string()));
            }
        }

        Ok(UserChanges { name, email })
    }
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            email: "a@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn serialized_user_omits_password_and_tombstone() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn debug_output_omits_password_hash() {
        let out = format!("{:?}", sample_user());
        assert!(!out.contains("argon2"));
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn update_request_treats_empty_strings_as_absent() {
        let req = UpdateUserRequest {
            name: Some(String::new()),
            email: Some("   ".to_string()),
        };
        assert!(req.into_changes().unwrap().is_empty());
    }

    #[test]
    fn update_request_validates_present_fields() {
        let req = UpdateUserRequest {
            name: None,
            email: Some("not-an-email".to_string()),
        };
        assert!(matches!(req.into_changes(), Err(AppError::Validation(_))));

        let req = UpdateUserRequest {
            name: Some("B".repeat(256)),
            email: None,
        };
        assert!(matches!(req.into_changes(), Err(AppError::Validation(_))));
    }

    #[test]
    fn changes_apply_only_present_fields() {
        let mut user = sample_user();
        UserChanges {
            name: None,
            email: Some("new@x.com".to_string()),
        }
        .apply(&mut user);
        assert_eq!(user.email, "new@x.com");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn register_request_enforces_password_length() {
        let req = RegisterRequest {
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            password: "12345".to_string(),
        };
        assert!(req.validate().is_err());
        let req = RegisterRequest {
            password: "secret1".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }
}
