//! Database-specific error types and conversions.

use harrastus_core::error::HarrastusError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// The database is behind the schema this build expects.
    #[error("Schema is at version {current}, version {required} is required; run the migrate job")]
    SchemaOutdated { current: u32, required: u32 },

    #[error("Query failed: {0}")]
    Query(String),

    /// A stored value could not be decoded into its domain type.
    #[error("Invalid {field} in stored row: {reason}")]
    InvalidRow { field: &'static str, reason: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub(crate) fn query(err: surrealdb::Error) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<DbError> for HarrastusError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HarrastusError::NotFound { entity, id },
            other => HarrastusError::Database(other.to_string()),
        }
    }
}
