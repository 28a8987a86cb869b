//! Snapshot persistence.
//!
//! The session serializes its document as a single keyed JSON blob after
//! every committed mutation and rehydrates it on startup. Backends are
//! pluggable through [`SnapshotStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::document::Document;
use thiserror::Error;

/// The fixed key the session persists under.
pub const SNAPSHOT_KEY: &str = "whiteboard";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Keyed snapshot persistence.
pub trait SnapshotStore {
    /// Save a document under a key, replacing any previous blob.
    fn save(&self, key: &str, document: &Document) -> StorageResult<()>;

    /// Load the document stored under a key.
    fn load(&self, key: &str) -> StorageResult<Document>;

    /// Remove the blob stored under a key. Missing keys are fine.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether a blob exists under a key.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
