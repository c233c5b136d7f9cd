//! Business logic over the user store.

pub mod users;

pub use crate::auth::AuthService;
pub use users::UserService;
