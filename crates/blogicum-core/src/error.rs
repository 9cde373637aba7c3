//! Domain-level error types.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Domain errors - business rule failures.
///
/// Lookups that miss are reported by the repositories as [`RepoError::NotFound`];
/// the domain itself only rejects input.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
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

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
