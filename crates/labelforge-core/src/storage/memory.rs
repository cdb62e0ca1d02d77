//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::document::LabelDocument;
use crate::format::{self, DocumentFormat};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Documents are kept serialized, so a load always yields an independent
/// copy exactly as a file round-trip would.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    format: DocumentFormat,
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: DocumentFormat) -> Self {
        Self {
            format,
            documents: RwLock::default(),
        }
    }

    /// The serialized form stored under `id`.
    pub fn raw(&self, id: &str) -> StorageResult<Option<String>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(docs.get(id).cloned())
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &LabelDocument) -> StorageResult<()> {
        let data = format::write_to_string(document, self.format)?;
        let mut docs = self
            .documents
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        docs.insert(id.to_string(), data);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<LabelDocument> {
        let data = self
            .raw(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(format::read_str(&data, self.format)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        docs.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.raw(id)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_memory_storage_save_load() {
        let storage = MemoryStorage::new();
        let mut doc = LabelDocument::new();
        let id = doc.create_text_item("Fragile", Point::new(5.0, 5.0));

        storage.save("shipping", &doc).unwrap();
        let loaded = storage.load("shipping").unwrap();
        assert_eq!(loaded.item_count(), 1);
        assert!(loaded.item_by_id(&id).is_some());
        assert!(!loaded.is_modified());
    }

    #[test]
    fn test_memory_storage_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(storage.load("missing"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_memory_storage_list_and_delete() {
        let storage = MemoryStorage::with_format(DocumentFormat::Json);
        let doc = LabelDocument::new();
        storage.save("b", &doc).unwrap();
        storage.save("a", &doc).unwrap();
        assert_eq!(storage.list().unwrap(), ["a", "b"]);
        assert!(storage.raw("a").unwrap().unwrap().starts_with('{'));

        storage.delete("a").unwrap();
        assert!(!storage.exists("a").unwrap());
        assert!(storage.exists("b").unwrap());
        storage.delete("a").unwrap();
    }

    #[test]
    fn test_memory_storage_corrupt_entry() {
        let storage = MemoryStorage::new();
        storage
            .documents
            .write()
            .unwrap()
            .insert("bad".to_string(), "<Label>".to_string());
        assert!(matches!(storage.load("bad"), Err(StorageError::Serialization(_))));
    }
}
