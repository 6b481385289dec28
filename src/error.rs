//! Error types for collection operations

use thiserror::Error;

/// Errors returned by the collection store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Invalid record {id}: {}", .reasons.join("; "))]
    Validation { id: String, reasons: Vec<String> },

    #[error("Duplicate post id: {0}")]
    DuplicateId(String),

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Index diverged from store: {0}")]
    InternalConsistency(String),

    #[error("Collection is halted after a consistency failure; mutations are refused")]
    Halted,
}

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, CollectionError>;

impl CollectionError {
    /// Whether the caller can keep using the collection after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CollectionError::InternalConsistency(_) | CollectionError::Halted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CollectionError::DuplicateId("1".to_string());
        assert_eq!(err.to_string(), "Duplicate post id: 1");

        let err = CollectionError::Validation {
            id: "7".to_string(),
            reasons: vec!["title is required".into(), "date is required".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid record 7: title is required; date is required"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(CollectionError::NotFound("x".into()).is_recoverable());
        assert!(CollectionError::DuplicateId("x".into()).is_recoverable());
        assert!(!CollectionError::Halted.is_recoverable());
        assert!(!CollectionError::InternalConsistency("x".into()).is_recoverable());
    }
}
