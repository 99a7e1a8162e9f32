//! Filesystem upload store

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::document_store::{DocumentStoreProvider, StoredDocumentInfo};

/// Local document store keeping uploads as plain files in one directory
pub struct LocalDocumentStore {
    /// Directory to store documents
    storage_dir: PathBuf,
}

impl LocalDocumentStore {
    /// Create a new local document store
    pub fn new(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Path for an upload; only the final path component of the client's
    /// filename is used
    fn doc_path(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| Error::load(filename, "invalid filename"))?;
        Ok(self.storage_dir.join(name))
    }
}

#[async_trait]
impl DocumentStoreProvider for LocalDocumentStore {
    async fn store_document(&self, filename: &str, data: &[u8]) -> Result<String> {
        let doc_path = self.doc_path(filename)?;

        // Directory may have been removed since startup
        tokio::fs::create_dir_all(&self.storage_dir).await?;
        tokio::fs::write(&doc_path, data).await?;

        Ok(doc_path.to_string_lossy().to_string())
    }

    async fn list_documents(&self) -> Result<Vec<StoredDocumentInfo>> {
        let mut docs = Vec::new();
        if !self.storage_dir.exists() {
            return Ok(docs);
        }

        let mut entries = tokio::fs::read_dir(&self.storage_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                let path = entry.path();
                docs.push(StoredDocumentInfo {
                    filename: entry.file_name().to_string_lossy().to_string(),
                    uri: path.to_string_lossy().to_string(),
                    size: metadata.len(),
                });
            }
        }

        Ok(docs)
    }

    async fn clear(&self) -> Result<usize> {
        if !self.storage_dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.storage_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.metadata().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        tracing::debug!("Removed {} uploaded files from {}", removed, self.storage_dir.display());
        Ok(removed)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.storage_dir.exists())
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_list_clear() {
        let dir = TempDir::new().unwrap();
        let store = LocalDocumentStore::new(dir.path().join("upload")).unwrap();

        store.store_document("a.md", b"# A").await.unwrap();
        store.store_document("b.json", b"{}").await.unwrap();
        // Same name overwrites
        store.store_document("a.md", b"# A again").await.unwrap();

        let docs = store.list_documents().await.unwrap();
        assert_eq!(docs.len(), 2);

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.list_documents().await.unwrap().is_empty());
        assert_eq!(store.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_path_components_are_stripped() {
        let dir = TempDir::new().unwrap();
        let store = LocalDocumentStore::new(dir.path().to_path_buf()).unwrap();

        let uri = store.store_document("../../etc/notes.txt", b"x").await.unwrap();
        assert_eq!(PathBuf::from(uri), dir.path().join("notes.txt"));
    }
}
