//! File-based storage.

use super::{Storage, StorageError, StorageResult};
use crate::document::LabelDocument;
use crate::format::{self, DocumentFormat};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Stores each document as one file in a directory.
///
/// The file extension follows the storage format: `.label` for the tree
/// form, `.json` for the object form.
#[derive(Debug)]
pub struct FileStorage {
    base_path: PathBuf,
    format: DocumentFormat,
}

impl FileStorage {
    /// Create a storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>, format: DocumentFormat) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path, format })
    }

    /// File path for a document id.
    pub fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path
            .join(format!("{}.{}", safe_id, self.format.extension()))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

/// Load a document from any path, picking the format from the extension
/// and falling back to the file content.
pub fn load_path(path: &Path) -> StorageResult<LabelDocument> {
    let data = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension)
        .or_else(|| DocumentFormat::sniff(data.as_bytes()))
        .ok_or_else(|| {
            StorageError::Serialization(format!("Unknown document format: {}", path.display()))
        })?;
    format::read_str(&data, format).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &LabelDocument) -> StorageResult<()> {
        let path = self.document_path(id);
        let file = File::create(&path)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        format::write_document(document, &mut writer, self.format)?;
        writer
            .flush()
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::debug!("Stored {} as {}", id, path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<LabelDocument> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let file = File::open(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        format::read_document(BufReader::new(file), self.format).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let extension = self.format.extension();
        let mut ids: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == extension))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).exists())
    }
}
