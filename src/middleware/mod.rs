//! Request gates: bearer-token authentication and role checks.

pub mod auth;

pub use auth::{require_auth, require_role, CurrentUser, Identity, RequiredRole};
