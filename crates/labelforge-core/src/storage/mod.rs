//! Storage backends for label documents.
//!
//! Backends store documents under string keys in one of the persisted
//! formats and hand back freshly parsed documents on load.

mod file;
mod memory;

pub use file::{FileStorage, load_path};
pub use memory::MemoryStorage;

use crate::document::LabelDocument;
use crate::format::FormatError;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<FormatError> for StorageError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => StorageError::Io(e.to_string()),
            other => StorageError::Serialization(other.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A keyed store of label documents.
pub trait Storage: Send + Sync {
    /// Save a document. Does not touch the document's modified flag.
    fn save(&self, id: &str, document: &LabelDocument) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<LabelDocument>;

    /// Delete a document. Deleting a missing id is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document ids.
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, id: &str) -> StorageResult<bool>;
}
