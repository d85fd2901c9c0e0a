//! Harrastus database layer: SurrealDB connection management, schema
//! migrations and the repository implementations behind the
//! `harrastus-core` traits.
//!
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema and migrations ([`run_migrations`], [`check_schema`])
//! - Repositories and the [`SurrealCatalog`] bundle ([`repository`])

mod connection;
mod error;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{SurrealCatalog, SurrealPermissionStore};
pub use schema::{check_schema, latest_schema_version, run_migrations, schema_v1, schema_version};
