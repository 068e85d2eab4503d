//! Error type shared by the row helpers, the lookup service and the HTTP layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A primary-key or unique-key value is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No row exists at the given primary key.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A value that ends up interpolated into SQL is not a safe identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Row decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A unique violation (SQLSTATE 23505) means a concurrent transaction took the
/// key between our check and our write; report it like the check would have.
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return ServiceError::Conflict(db.message().to_string());
            }
        }
        ServiceError::Database(err)
    }
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Database(_) => "DATABASE_ERROR",
            ServiceError::Decode(_) => "DECODE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_variant() {
        assert_eq!(ServiceError::Conflict("x".into()).error_code(), "CONFLICT");
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(
            ServiceError::InvalidIdentifier("x".into()).error_code(),
            "INVALID_IDENTIFIER"
        );
        assert_eq!(
            ServiceError::Database(sqlx::Error::RowNotFound).error_code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn non_constraint_errors_stay_database_errors() {
        let err: ServiceError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ServiceError::Database(_)));
    }

    #[test]
    fn display_keeps_detail() {
        let err = ServiceError::Conflict("_lookups: lookup_type=status already exists".into());
        assert_eq!(
            err.to_string(),
            "Conflict: _lookups: lookup_type=status already exists"
        );
    }
}
