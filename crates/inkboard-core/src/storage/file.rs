//! File-based storage implementation (one JSON file per key).

use super::{SnapshotStore, StorageError, StorageResult};
use crate::document::Document;
use std::fs;
use std::path::PathBuf;

/// Stores snapshots as JSON files under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the platform data directory.
    pub fn new() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inkboard");
        Self { root }
    }

    /// Create a store rooted at a specific directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for FileStore {
    fn save(&self, key: &str, document: &Document) -> StorageResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError::Io(e.to_string()))?;
        let json = serde_json::to_string(document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(self.path_for(key), json).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn load(&self, key: &str) -> StorageResult<Document> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let json = fs::read_to_string(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.path_for(key).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind, StyleDefaults, Theme};
    use kurbo::Point;
    use tempfile::TempDir;

    fn sample_doc() -> Document {
        let style = StyleDefaults::for_theme(Theme::Light);
        let mut el = Element::new(ElementKind::Rectangle, Point::new(1.0, 2.0), &style);
        el.width = 30.0;
        el.height = 40.0;
        Document::new().add(el)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_root(dir.path());
        let doc = sample_doc();

        store.save("board", &doc).unwrap();
        let loaded = store.load("board").unwrap();
        assert_eq!(doc, loaded);
    }

    #[test]
    fn test_load_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_root(dir.path());
        assert!(matches!(
            store.load("missing"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_root(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("board.json"), "{not json").unwrap();

        assert!(matches!(
            store.load("board"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_delete_and_exists() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_root(dir.path());
        let doc = sample_doc();

        assert!(!store.exists("board").unwrap());
        store.save("board", &doc).unwrap();
        assert!(store.exists("board").unwrap());
        store.delete("board").unwrap();
        assert!(!store.exists("board").unwrap());
        store.delete("board").unwrap();
    }

    #[test]
    fn test_save_creates_root_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::with_root(&nested);
        store.save("board", &sample_doc()).unwrap();
        assert!(nested.join("board.json").exists());
    }
}
