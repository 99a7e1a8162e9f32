//! Collection lifecycle: ensure, clear, and per-collection locking

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::error::{Error, Result};
use crate::providers::{CollectionSpec, VectorDatabase};

/// Lifecycle state of one collection as seen by this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    /// Not known to exist
    Absent,
    /// Create in flight
    Creating,
    /// Exists with the expected parameters
    Ready,
    /// Delete-and-recreate in flight
    Clearing,
}

/// Owns collection creation and clearing and the lock that serialises
/// mutations of a collection
///
/// Mutations (`ensure`, `clear`, upserts) hold the write side of the
/// collection's lock; queries hold the read side.
pub struct CollectionLifecycleManager {
    db: Arc<dyn VectorDatabase>,
    locks: DashMap<String, Arc<RwLock<CollectionState>>>,
}

impl CollectionLifecycleManager {
    pub fn new(db: Arc<dyn VectorDatabase>) -> Self {
        Self {
            db,
            locks: DashMap::new(),
        }
    }

    /// Backing database
    pub fn database(&self) -> &Arc<dyn VectorDatabase> {
        &self.db
    }

    fn lock(&self, name: &str) -> Arc<RwLock<CollectionState>> {
        self.locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(CollectionState::Absent)))
            .clone()
    }

    /// Current state; waits for an in-flight mutation
    pub async fn state(&self, name: &str) -> CollectionState {
        *self.lock(name).read().await
    }

    /// Exclusive access to a collection for a mutation
    pub async fn write(&self, name: &str) -> OwnedRwLockWriteGuard<CollectionState> {
        self.lock(name).write_owned().await
    }

    /// Shared access to a collection for a query
    pub async fn read(&self, name: &str) -> OwnedRwLockReadGuard<CollectionState> {
        self.lock(name).read_owned().await
    }

    /// Create the collection unless it already exists with matching parameters
    pub async fn ensure(&self, spec: &CollectionSpec) -> Result<()> {
        let mut state = self.write(&spec.name).await;
        self.ensure_locked(spec, &mut state).await
    }

    /// `ensure` for a caller already holding the write guard
    pub(crate) async fn ensure_locked(
        &self,
        spec: &CollectionSpec,
        state: &mut CollectionState,
    ) -> Result<()> {
        let existing = match self.db.collection_spec(&spec.name).await {
            Ok(existing) => existing,
            Err(e) => {
                *state = CollectionState::Absent;
                return Err(e);
            }
        };

        match existing {
            Some(existing) if spec.is_compatible(&existing) => {
                *state = CollectionState::Ready;
                Ok(())
            }
            Some(existing) => Err(Error::vector_store(format!(
                "collection '{}' exists with {} dimensions ({}), expected {} ({})",
                spec.name,
                existing.dimensions,
                existing.metric.as_str(),
                spec.dimensions,
                spec.metric.as_str()
            ))),
            None => {
                *state = CollectionState::Creating;
                match self.db.create_collection(spec).await {
                    Ok(()) => {
                        *state = CollectionState::Ready;
                        tracing::info!(
                            collection = %spec.name,
                            dimensions = spec.dimensions,
                            "Created collection on {}",
                            self.db.name()
                        );
                        Ok(())
                    }
                    Err(e) => {
                        *state = CollectionState::Absent;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Drop the collection (if present) and recreate it empty
    pub async fn clear(&self, spec: &CollectionSpec) -> Result<()> {
        let mut state = self.write(&spec.name).await;
        *state = CollectionState::Clearing;

        let result = async {
            self.db.delete_collection(&spec.name).await?;
            self.db.create_collection(spec).await
        }
        .await;

        match result {
            Ok(()) => {
                *state = CollectionState::Ready;
                tracing::info!(collection = %spec.name, "Cleared collection on {}", self.db.name());
                Ok(())
            }
            Err(e) => {
                // Next ensure recreates it
                *state = CollectionState::Absent;
                tracing::error!(collection = %spec.name, "Failed to clear collection: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::InMemoryVectorDb;
    use crate::providers::DistanceMetric;

    fn manager() -> (CollectionLifecycleManager, Arc<InMemoryVectorDb>) {
        let db = Arc::new(InMemoryVectorDb::new());
        (CollectionLifecycleManager::new(db.clone()), db)
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let (manager, db) = manager();
        let spec = CollectionSpec::new("docs", 4, DistanceMetric::Cosine);

        assert_eq!(manager.state("docs").await, CollectionState::Absent);
        manager.ensure(&spec).await.unwrap();
        manager.ensure(&spec).await.unwrap();

        assert_eq!(manager.state("docs").await, CollectionState::Ready);
        assert!(db.collection_exists("docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_rejects_dimension_mismatch() {
        let (manager, _db) = manager();
        manager
            .ensure(&CollectionSpec::new("docs", 4, DistanceMetric::Cosine))
            .await
            .unwrap();

        let err = manager
            .ensure(&CollectionSpec::new("docs", 8, DistanceMetric::Cosine))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VectorStore(_)));
    }

    #[tokio::test]
    async fn test_clear_twice_leaves_existing_empty_collection() {
        let (manager, db) = manager();
        let spec = CollectionSpec::new("docs", 2, DistanceMetric::Cosine);

        // Clearing a collection that never existed still creates it
        manager.clear(&spec).await.unwrap();
        manager.clear(&spec).await.unwrap();

        assert!(db.collection_exists("docs").await.unwrap());
        assert_eq!(db.count("docs").await.unwrap(), 0);
        assert_eq!(manager.state("docs").await, CollectionState::Ready);
    }
}
