//! Authentication: password hashing, bearer tokens, register and login.

mod handlers;
mod jwt;
mod password;
mod service;

pub use handlers::{login, me, register};
pub use jwt::{Claims, TokenCodec, TokenError};
pub use password::{hash_password, verify_password};
pub use service::AuthService;
