// Error types for the farm core
//
// Only two things can go wrong with a mutation: the draft is rejected, or the
// document could not be written back. Delete of a missing id and corrupted
// persisted state are not errors.

use crate::schema::{describe, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("validation failed: {}", describe(.0))]
    Validation(Vec<ValidationError>),

    #[error("failed to persist farm data: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to serialize farm data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FarmError {
    pub fn is_validation(&self) -> bool {
        matches!(self, FarmError::Validation(_))
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            FarmError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, FarmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_lists_fields() {
        let err = FarmError::Validation(vec![ValidationError::new(
            "HealthRecord",
            "cost",
            "Must not be negative, got -10",
        )]);

        assert!(err.is_validation());
        assert_eq!(err.validation_errors().len(), 1);
        assert_eq!(
            err.to_string(),
            "validation failed: [HealthRecord] cost: Must not be negative, got -10"
        );
    }

    #[test]
    fn test_storage_error_is_not_validation() {
        let err: FarmError = StorageError::Unavailable("disk full".to_string()).into();
        assert!(!err.is_validation());
        assert!(err.validation_errors().is_empty());
        assert!(err.to_string().contains("disk full"));
    }
}
