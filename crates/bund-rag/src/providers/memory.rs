//! In-process vector database
//!
//! Collections live in a `HashMap` behind a `parking_lot::RwLock`. Scoring is
//! brute force, which is fine for tests and small single-node deployments.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::vector_store::{CollectionSpec, DistanceMetric, ScoredRecord, VectorDatabase, VectorRecord};

struct MemoryCollection {
    spec: CollectionSpec,
    points: HashMap<Uuid, (Vec<f32>, Map<String, Value>)>,
}

/// In-memory vector database
#[derive(Default)]
pub struct InMemoryVectorDb {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl InMemoryVectorDb {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product(a, b);
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

fn missing(collection: &str) -> Error {
    Error::vector_store(format!("collection '{}' does not exist", collection))
}

#[async_trait]
impl VectorDatabase for InMemoryVectorDb {
    async fn collection_spec(&self, name: &str) -> Result<Option<CollectionSpec>> {
        Ok(self.collections.read().get(name).map(|c| c.spec.clone()))
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(&spec.name) {
            return Err(Error::vector_store(format!(
                "collection '{}' already exists",
                spec.name
            )));
        }
        collections.insert(
            spec.name.clone(),
            MemoryCollection {
                spec: spec.clone(),
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<()> {
        let mut collections = self.collections.write();
        let store = collections.get_mut(collection).ok_or_else(|| missing(collection))?;

        // Validate the whole batch before touching anything
        let dims = store.spec.dimensions;
        if let Some(bad) = records.iter().find(|r| r.vector.len() != dims) {
            return Err(Error::vector_store(format!(
                "wrong vector dimension for point {}: expected {}, got {}",
                bad.id,
                dims,
                bad.vector.len()
            )));
        }

        for record in records {
            store.points.insert(record.id, (record.vector, record.payload));
        }
        Ok(())
    }

    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredRecord>> {
        let collections = self.collections.read();
        let store = collections.get(collection).ok_or_else(|| missing(collection))?;

        if vector.len() != store.spec.dimensions {
            return Err(Error::vector_store(format!(
                "wrong query dimension: expected {}, got {}",
                store.spec.dimensions,
                vector.len()
            )));
        }

        let metric = store.spec.metric;
        let mut scored: Vec<ScoredRecord> = store
            .points
            .iter()
            .map(|(id, (point, payload))| {
                let score = match metric {
                    DistanceMetric::Cosine => cosine_similarity(point, vector),
                    DistanceMetric::Dot => dot_product(point, vector),
                    DistanceMetric::Euclid => euclidean_distance(point, vector),
                };
                ScoredRecord {
                    id: *id,
                    score,
                    payload: payload.clone(),
                }
            })
            .collect();

        match metric {
            DistanceMetric::Euclid => scored.sort_by(|a, b| a.score.total_cmp(&b.score)),
            _ => scored.sort_by(|a, b| b.score.total_cmp(&a.score)),
        }
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read();
        let store = collections.get(collection).ok_or_else(|| missing(collection))?;
        Ok(store.points.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
