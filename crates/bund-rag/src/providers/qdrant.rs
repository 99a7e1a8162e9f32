//! Qdrant vector database backend over gRPC

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfig;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::vector_store::{CollectionSpec, DistanceMetric, ScoredRecord, VectorDatabase, VectorRecord};

/// A [`VectorDatabase`] backed by [Qdrant](https://qdrant.tech/)
pub struct QdrantVectorDb {
    client: Qdrant,
}

impl QdrantVectorDb {
    /// Connect to the given gRPC URL (e.g. `http://localhost:6334`)
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(map_err)?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }
}

fn map_err(e: qdrant_client::QdrantError) -> Error {
    Error::vector_store(format!("qdrant: {}", e))
}

fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Dot => Distance::Dot,
        DistanceMetric::Euclid => Distance::Euclid,
    }
}

fn from_qdrant_distance(distance: Distance) -> Option<DistanceMetric> {
    match distance {
        Distance::Cosine => Some(DistanceMetric::Cosine),
        Distance::Dot => Some(DistanceMetric::Dot),
        Distance::Euclid => Some(DistanceMetric::Euclid),
        _ => None,
    }
}

/// Convert a Qdrant payload value back to JSON
fn to_json(value: &QdrantValue) -> Value {
    match &value.kind {
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::IntegerValue(i)) => Value::from(*i),
        Some(Kind::DoubleValue(d)) => Value::from(*d),
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
        Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(to_json).collect()),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

#[async_trait]
impl VectorDatabase for QdrantVectorDb {
    async fn collection_spec(&self, name: &str) -> Result<Option<CollectionSpec>> {
        let collections = self.client.list_collections().await.map_err(map_err)?;
        if !collections.collections.iter().any(|c| c.name == name) {
            return Ok(None);
        }

        let info = self.client.collection_info(name).await.map_err(map_err)?;
        let vectors = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config);

        match vectors {
            Some(VectorsConfig::Params(params)) => {
                let metric = from_qdrant_distance(params.distance()).ok_or_else(|| {
                    Error::vector_store(format!(
                        "collection '{}' uses an unsupported distance {:?}",
                        name,
                        params.distance()
                    ))
                })?;
                Ok(Some(CollectionSpec::new(name, params.size as usize, metric)))
            }
            _ => Err(Error::vector_store(format!(
                "collection '{}' does not have a single unnamed vector",
                name
            ))),
        }
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(spec.name.as_str()).vectors_config(
                    VectorParamsBuilder::new(spec.dimensions as u64, to_qdrant_distance(spec.metric)),
                ),
            )
            .await
            .map_err(map_err)?;

        debug!(collection = %spec.name, dimensions = spec.dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(map_err)?;
        if !collections.collections.iter().any(|c| c.name == name) {
            return Ok(());
        }

        self.client.delete_collection(name).await.map_err(map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let count = records.len();
        let points = records
            .into_iter()
            .map(|record| {
                let payload = Payload::try_from(Value::Object(record.payload)).map_err(|e| {
                    Error::vector_store(format!("invalid payload for point {}: {}", record.id, e))
                })?;
                Ok(PointStruct::new(record.id.to_string(), record.vector, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(map_err)?;

        debug!(collection, count, "upserted points to qdrant");
        Ok(())
    }

    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredRecord>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64).with_payload(true),
            )
            .await
            .map_err(map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Uuid::parse_str(s).ok(),
                        _ => None,
                    })
                    .unwrap_or_else(Uuid::nil);

                let payload: Map<String, Value> = scored
                    .payload
                    .iter()
                    .map(|(k, v)| (k.clone(), to_json(v)))
                    .collect();

                ScoredRecord {
                    id,
                    score: scored.score,
                    payload,
                }
            })
            .collect();

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(map_err)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.client.health_check().await.is_ok())
    }

    fn name(&self) -> &str {
        "Qdrant"
    }
}
