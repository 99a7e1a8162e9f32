//! Document store provider trait for persisting uploaded files

use async_trait::async_trait;
use crate::error::Result;

/// Metadata about a stored upload
#[derive(Debug, Clone)]
pub struct StoredDocumentInfo {
    /// Stored filename
    pub filename: String,
    /// Storage URI (file path)
    pub uri: String,
    /// Size in bytes
    pub size: u64,
}

/// Trait for upload storage
///
/// Implementations:
/// - `LocalDocumentStore`: Local filesystem
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Persist an uploaded file under its filename, replacing any previous
    /// file of the same name
    ///
    /// Returns the storage URI
    async fn store_document(&self, filename: &str, data: &[u8]) -> Result<String>;

    /// List stored uploads
    async fn list_documents(&self) -> Result<Vec<StoredDocumentInfo>>;

    /// Remove every stored upload, returning how many were deleted
    async fn clear(&self) -> Result<usize>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
