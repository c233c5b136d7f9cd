//! Data models: the user record and its API shapes.

pub mod user;

pub use user::*;
