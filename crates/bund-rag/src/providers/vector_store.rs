//! Vector database provider trait for collections of embedded points

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Result;

/// Similarity metric a collection is created with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity, in [-1, 1]
    #[default]
    Cosine,
    /// Raw dot product
    Dot,
    /// Euclidean distance (lower is closer)
    Euclid,
}

impl DistanceMetric {
    /// Map a raw backend score to a similarity where higher is better
    pub fn similarity(self, raw: f32) -> f32 {
        match self {
            Self::Cosine | Self::Dot => raw,
            Self::Euclid => 1.0 / (1.0 + raw.max(0.0)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Dot => "dot",
            Self::Euclid => "euclid",
        }
    }
}

/// Name and vector parameters of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    pub dimensions: usize,
    pub metric: DistanceMetric,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>, dimensions: usize, metric: DistanceMetric) -> Self {
        Self {
            name: name.into(),
            dimensions,
            metric,
        }
    }

    /// Whether an existing collection can be used as this one
    pub fn is_compatible(&self, existing: &CollectionSpec) -> bool {
        self.dimensions == existing.dimensions && self.metric == existing.metric
    }
}

/// A point to write
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// A point returned by a search, with the backend's raw score
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: Uuid,
    pub score: f32,
    pub payload: Map<String, Value>,
}

/// Trait for a vector database holding named collections
///
/// Implementations:
/// - `QdrantVectorDb`: Qdrant over gRPC
/// - `InMemoryVectorDb`: process-local, for tests and single-node demos
#[async_trait]
pub trait VectorDatabase: Send + Sync {
    /// Parameters of an existing collection, `None` if it does not exist
    async fn collection_spec(&self, name: &str) -> Result<Option<CollectionSpec>>;

    /// Check if a collection exists
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collection_spec(name).await?.is_some())
    }

    /// Create a collection; fails if it already exists
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()>;

    /// Drop a collection and all of its points; absent collections are a no-op
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Write points, replacing points with the same ID
    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<()>;

    /// Nearest points to `vector`, best first, at most `limit`
    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredRecord>>;

    /// Number of points in a collection
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging and user-facing messages
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_is_higher_is_better() {
        assert_eq!(DistanceMetric::Cosine.similarity(0.8), 0.8);
        assert!(DistanceMetric::Euclid.similarity(0.1) > DistanceMetric::Euclid.similarity(2.0));
        assert_eq!(DistanceMetric::Euclid.similarity(0.0), 1.0);
    }

    #[test]
    fn test_compatibility_checks_dims_and_metric() {
        let spec = CollectionSpec::new("c", 1024, DistanceMetric::Cosine);
        assert!(spec.is_compatible(&CollectionSpec::new("c", 1024, DistanceMetric::Cosine)));
        assert!(!spec.is_compatible(&CollectionSpec::new("c", 768, DistanceMetric::Cosine)));
        assert!(!spec.is_compatible(&CollectionSpec::new("c", 1024, DistanceMetric::Dot)));
    }
}
