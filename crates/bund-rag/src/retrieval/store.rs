//! Vector store manager: guarded upserts and ranked queries

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{CollectionSpec, VectorRecord};
use crate::types::{Chunk, ScoredContext};

use super::collection::{CollectionLifecycleManager, CollectionState};

/// Writes embedded chunks and answers nearest-neighbour queries
pub struct VectorStoreManager {
    collections: Arc<CollectionLifecycleManager>,
}

impl VectorStoreManager {
    pub fn new(collections: Arc<CollectionLifecycleManager>) -> Self {
        Self { collections }
    }

    pub fn collections(&self) -> &Arc<CollectionLifecycleManager> {
        &self.collections
    }

    /// Insert all chunks in one store call
    ///
    /// The collection is ensured first. Every chunk's embedding must match the
    /// collection's dimension; otherwise nothing is written.
    pub async fn upsert(&self, spec: &CollectionSpec, chunks: &[Chunk]) -> Result<usize> {
        let mut state = self.collections.write(&spec.name).await;
        self.collections.ensure_locked(spec, &mut state).await?;

        if chunks.is_empty() {
            return Ok(0);
        }

        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != spec.dimensions) {
            return Err(Error::vector_store(format!(
                "embedding dimension mismatch for chunk {} of '{}': expected {}, got {}",
                bad.chunk_index,
                bad.source.filename,
                spec.dimensions,
                bad.embedding.len()
            )));
        }

        let records = chunks
            .iter()
            .map(|chunk| VectorRecord {
                id: chunk.id,
                vector: chunk.embedding.clone(),
                payload: chunk.to_payload(),
            })
            .collect();

        self.collections
            .database()
            .upsert(&spec.name, records)
            .await?;

        tracing::debug!(collection = %spec.name, count = chunks.len(), "Upserted chunks");
        Ok(chunks.len())
    }

    /// Up to `k` nearest chunks, best first, scored so higher is more similar
    pub async fn query(&self, spec: &CollectionSpec, embedding: &[f32], k: usize) -> Result<Vec<ScoredContext>> {
        if embedding.len() != spec.dimensions {
            return Err(Error::vector_store(format!(
                "query embedding has {} dimensions, collection '{}' expects {}",
                embedding.len(),
                spec.name,
                spec.dimensions
            )));
        }

        if self.collections.state(&spec.name).await != CollectionState::Ready {
            self.collections.ensure(spec).await?;
        }

        let _guard = self.collections.read(&spec.name).await;
        let hits = self
            .collections
            .database()
            .search(&spec.name, embedding, k)
            .await?;

        let contexts = hits
            .into_iter()
            .map(|hit| {
                let chunk = Chunk::from_payload(hit.id, &hit.payload);
                ScoredContext::from_chunk(chunk, spec.metric.similarity(hit.score))
            })
            .collect();

        Ok(contexts)
    }
}
