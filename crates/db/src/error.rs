//! Storage error taxonomy.

use std::time::Duration;

/// PostgreSQL SQLSTATE codes the repository layer classifies.
const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";
const PG_EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A unique, foreign-key or check constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The room is already blocked for some of the requested nights.
    #[error("Room is not available for the requested dates")]
    Unavailable,

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Failure raised by a non-SQL backend.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepoError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some(PG_EXCLUSION_VIOLATION) => return RepoError::Unavailable,
                Some(PG_UNIQUE_VIOLATION | PG_FOREIGN_KEY_VIOLATION | PG_CHECK_VIOLATION) => {
                    return RepoError::Constraint(constraint);
                }
                _ => {}
            }
        }
        RepoError::Database(err)
    }
}
