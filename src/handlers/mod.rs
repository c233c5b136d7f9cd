//! HTTP request handlers and the extractors they share.

pub mod extract;
pub mod http;
pub mod users;

pub use http::*;
pub use users::*;
