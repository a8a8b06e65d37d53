// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Content extraction failed for {file}: {message}")]
    ContentExtraction { file: String, message: String },

    #[error("Unsupported content type: {mime_type}")]
    UnsupportedContent { mime_type: String },

    #[error("Graph store error: {0}")]
    GraphStore(String),

    #[error("Tag store error: {0}")]
    TagStore(#[from] StoreError),

    #[error("Document store error: {0}")]
    DocumentStore(String),

    #[error("Invalid rewrite rule {search:?}: {message}")]
    RewriteRule { search: String, message: String },

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Serialization(e.to_string())
    }
}

/// Failure reported by a backing store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected a create; the entity already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: PipelineError = StoreError::Conflict("actor:APT29".to_string()).into();
        assert!(matches!(err, PipelineError::TagStore(StoreError::Conflict(_))));
        assert_eq!(err.to_string(), "Tag store error: conflict: actor:APT29");
    }

    #[test]
    fn test_timeout_message() {
        let err = PipelineError::Timeout {
            operation: "content extraction".to_string(),
            secs: 30,
        };
        assert_eq!(err.to_string(), "content extraction timed out after 30s");
    }
}
