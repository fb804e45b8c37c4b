//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Store(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity_type, id }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation (SQLSTATE 23505).
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Foreign key violation (SQLSTATE 23503).
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),
}

impl RepoError {
    /// Classify a raw store error message by its SQLSTATE code or wording.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("23505") || lower.contains("duplicate") || lower.contains("unique") {
            RepoError::Duplicate(message)
        } else if lower.contains("23503") || lower.contains("foreign key") {
            RepoError::ForeignKey(message)
        } else {
            RepoError::Query(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_unique_violation() {
        let err = RepoError::from_message(
            "duplicate key value violates unique constraint \"posts_slug_key\"",
        );
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = RepoError::from_message("error returned from database: 23505");
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[test]
    fn test_classifies_foreign_key_violation() {
        let err = RepoError::from_message(
            "update or delete on table \"authors\" violates foreign key constraint",
        );
        assert!(matches!(err, RepoError::ForeignKey(_)));
    }

    #[test]
    fn test_other_messages_are_query_errors() {
        let err = RepoError::from_message("connection reset by peer");
        assert!(matches!(err, RepoError::Query(_)));
    }
}
