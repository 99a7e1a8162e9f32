//! Upload pipeline orchestration

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{CollectionSpec, DocumentStoreProvider, EmbeddingProvider};
use crate::retrieval::VectorStoreManager;
use crate::types::{Chunk, Document, UploadedFile};

use super::chunker::TextChunker;
use super::dispatcher::FormatDispatcher;

/// What one failing file does to the rest of its batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// First failure aborts the batch; nothing is committed
    #[default]
    AllOrNothing,
    /// Failing files are skipped and reported; the rest are committed
    PerFile,
}

/// A file left out of a `PerFile` batch
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Outcome of one upload batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    /// Files whose chunks were committed
    pub files: usize,
    /// Chunks written to the vector store
    pub chunks: usize,
    /// Files skipped under `BatchPolicy::PerFile`
    pub skipped: Vec<SkippedFile>,
}

impl UploadReport {
    /// Human-readable summary returned to clients
    pub fn message(&self) -> String {
        let mut message = format!(
            "Successfully uploaded {} file(s) in {} chunks to the vector store",
            self.files, self.chunks
        );
        if !self.skipped.is_empty() {
            let names: Vec<&str> = self.skipped.iter().map(|s| s.filename.as_str()).collect();
            message.push_str(&format!(" (skipped {}: {})", names.len(), names.join(", ")));
        }
        message
    }
}

/// Persist, load, chunk, embed and store a batch of uploaded files
pub struct UploadPipeline {
    dispatcher: FormatDispatcher,
    chunker: TextChunker,
    documents: Arc<dyn DocumentStoreProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<VectorStoreManager>,
    collection: CollectionSpec,
    policy: BatchPolicy,
}

impl UploadPipeline {
    pub fn new(
        dispatcher: FormatDispatcher,
        chunker: TextChunker,
        documents: Arc<dyn DocumentStoreProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<VectorStoreManager>,
        collection: CollectionSpec,
    ) -> Self {
        Self {
            dispatcher,
            chunker,
            documents,
            embedder,
            store,
            collection,
            policy: BatchPolicy::default(),
        }
    }

    /// Set the batch policy
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Persist one file and turn it into unembedded chunks
    pub async fn prepare_file(&self, file: &UploadedFile) -> Result<Vec<Chunk>> {
        self.documents
            .store_document(&file.filename, &file.data)
            .await?;

        let format = self.dispatcher.format_for(&file.filename)?;
        let loader = self.dispatcher.dispatch(&file.filename)?;
        let doc = Document::new(file.filename.clone(), format, file.data.clone());

        tracing::debug!(
            filename = %doc.filename,
            format = format.display_name(),
            size = doc.size(),
            hash = %doc.content_hash,
            "Loading document"
        );

        // PDF and DOCX parsing is CPU-bound
        let segments = tokio::task::spawn_blocking(move || loader.load(&doc))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        let mut chunks = Vec::new();
        for segment in &segments {
            let next_index = chunks.len() as u32;
            chunks.extend(self.chunker.chunk_segment(segment, next_index)?);
        }

        tracing::info!(
            filename = %file.filename,
            segments = segments.len(),
            chunks = chunks.len(),
            "Prepared document"
        );

        Ok(chunks)
    }

    /// Process a batch: files sequentially, then one embedding pass and one upsert
    pub async fn upload(&self, files: Vec<UploadedFile>) -> Result<UploadReport> {
        let mut report = UploadReport::default();
        let mut pending = Vec::new();

        for file in &files {
            match self.prepare_file(file).await {
                Ok(chunks) => {
                    report.files += 1;
                    pending.extend(chunks);
                }
                Err(e) if self.policy == BatchPolicy::PerFile => {
                    tracing::warn!(filename = %file.filename, code = e.code(), "Skipping file: {}", e);
                    report.skipped.push(SkippedFile {
                        filename: file.filename.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if !pending.is_empty() {
            let texts: Vec<String> = pending.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != pending.len() {
                return Err(Error::embedding(format!(
                    "expected {} embeddings, got {}",
                    pending.len(),
                    embeddings.len()
                )));
            }

            for (chunk, embedding) in pending.iter_mut().zip(embeddings) {
                chunk.embedding = embedding;
            }
        }

        report.chunks = self.store.upsert(&self.collection, &pending).await?;

        tracing::info!(
            files = report.files,
            chunks = report.chunks,
            skipped = report.skipped.len(),
            "Upload complete"
        );

        Ok(report)
    }
}
