use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("collection '{collection}' not found at {}", .path.display())]
    CollectionNotFound { collection: String, path: PathBuf },

    #[error("prompt template error: {0}")]
    Template(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error(
        "collection '{collection}' was indexed with embedder '{indexed}' \
         but the current configuration uses '{current}'"
    )]
    EmbedderMismatch {
        collection: String,
        indexed: String,
        current: String,
    },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("store error at {}: {message}", .path.display())]
    Store { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
