//! Database layer: pool and migrations for PostgreSQL.

mod pool;

pub use pool::{create_pool, run_migrations, DbPool};
