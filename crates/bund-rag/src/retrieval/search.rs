//! Query-time retrieval

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{CollectionSpec, EmbeddingProvider};
use crate::types::RetrievedContext;

use super::store::VectorStoreManager;

/// Embeds a question and fetches its nearest chunks
pub struct RetrievalOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<VectorStoreManager>,
    collection: CollectionSpec,
}

impl RetrievalOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<VectorStoreManager>,
        collection: CollectionSpec,
    ) -> Self {
        Self {
            embedder,
            store,
            collection,
        }
    }

    /// Top `k` contexts for `query`, highest similarity first
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext> {
        let embedding = self.embedder.embed(query).await?;
        let entries = self.store.query(&self.collection, &embedding, k).await?;

        let context = RetrievedContext::ranked(entries, k);
        tracing::debug!(
            k,
            found = context.len(),
            top_score = ?context.top().map(|c| c.score),
            "Retrieved contexts"
        );

        Ok(context)
    }
}
