//! Collection management, vector storage and retrieval

pub mod collection;
pub mod search;
pub mod store;

pub use collection::{CollectionLifecycleManager, CollectionState};
pub use search::RetrievalOrchestrator;
pub use store::VectorStoreManager;
