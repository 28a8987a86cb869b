//! In-memory storage implementation.

use super::{SnapshotStore, StorageError, StorageResult};
use crate::document::Document;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, key: &str, document: &Document) -> StorageResult<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        snapshots.insert(key.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<Document> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        snapshots
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        snapshots.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(snapshots.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        let doc = Document::new();

        store.save("test", &doc).unwrap();
        let loaded = store.load("test").unwrap();
        assert_eq!(doc, loaded);
    }

    #[test]
    fn test_not_found() {
        let store = MemoryStore::new();
        let result = store.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists() {
        let store = MemoryStore::new();
        let doc = Document::new();

        assert!(!store.exists("test").unwrap());
        store.save("test", &doc).unwrap();
        assert!(store.exists("test").unwrap());
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        let doc = Document::new();

        store.save("test", &doc).unwrap();
        store.delete("test").unwrap();
        assert!(!store.exists("test").unwrap());
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete("never-saved").is_ok());
    }
}
