//! Application state for the RAG server

use std::sync::Arc;

use crate::config::{LlmBackend, RagConfig, VectorBackend};
use crate::error::{Error, Result};
use crate::generation::GenerationOrchestrator;
use crate::ingestion::{FormatDispatcher, TextChunker, UploadPipeline};
use crate::providers::{
    local::LocalDocumentStore,
    memory::InMemoryVectorDb,
    ollama::{OllamaEmbedder, OllamaLlm},
    openai::OpenAiChatClient,
    qdrant::QdrantVectorDb,
    CollectionSpec, DocumentStoreProvider, EmbeddingProvider, LlmProvider, VectorDatabase,
};
use crate::retrieval::{CollectionLifecycleManager, RetrievalOrchestrator, VectorStoreManager};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// The collection every request works against
    collection: CollectionSpec,
    /// Uploaded file storage
    documents: Arc<dyn DocumentStoreProvider>,
    /// Collection lifecycle and locking
    collections: Arc<CollectionLifecycleManager>,
    /// Ingestion
    pipeline: UploadPipeline,
    /// Query-time retrieval
    retrieval: RetrievalOrchestrator,
    /// Answer generation
    generation: GenerationOrchestrator,
}

impl AppState {
    /// Create application state with clients built from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing RAG application state (vector db: {:?}, llm: {:?})...",
            config.vector_db.backend,
            config.llm.backend
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
        tracing::info!(
            "Embedding provider initialized ({} at {})",
            config.embeddings.model,
            config.embeddings.base_url
        );

        let llm: Arc<dyn LlmProvider> = match config.llm.backend {
            LlmBackend::OpenAi => Arc::new(OpenAiChatClient::new(&config.llm)?),
            LlmBackend::Ollama => Arc::new(OllamaLlm::new(&config.llm)?),
        };
        tracing::info!("LLM provider initialized ({} / {})", llm.name(), llm.model());

        let vector_db: Arc<dyn VectorDatabase> = match config.vector_db.backend {
            VectorBackend::Qdrant => Arc::new(QdrantVectorDb::new(&config.vector_db.url)?),
            VectorBackend::Memory => Arc::new(InMemoryVectorDb::new()),
        };
        tracing::info!("Vector database initialized ({})", vector_db.name());

        let documents: Arc<dyn DocumentStoreProvider> =
            Arc::new(LocalDocumentStore::new(config.upload.dir.clone())?);
        tracing::info!("Upload directory: {}", config.upload.dir.display());

        Self::from_parts(config, embedder, llm, vector_db, documents)
    }

    /// Assemble state from already-built providers
    pub fn from_parts(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        vector_db: Arc<dyn VectorDatabase>,
        documents: Arc<dyn DocumentStoreProvider>,
    ) -> Result<Self> {
        config.validate()?;

        if embedder.dimensions() != config.embeddings.dimensions {
            return Err(Error::Config(format!(
                "embedding provider '{}' produces {} dimensions but embeddings.dimensions is {}",
                embedder.name(),
                embedder.dimensions(),
                config.embeddings.dimensions
            )));
        }

        let collection = config.collection_spec();
        let collections = Arc::new(CollectionLifecycleManager::new(vector_db));
        let store = Arc::new(VectorStoreManager::new(Arc::clone(&collections)));

        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let pipeline = UploadPipeline::new(
            FormatDispatcher::new(),
            chunker,
            Arc::clone(&documents),
            Arc::clone(&embedder),
            Arc::clone(&store),
            collection.clone(),
        )
        .with_policy(config.upload.batch_policy);

        let retrieval = RetrievalOrchestrator::new(embedder, store, collection.clone());
        let generation = GenerationOrchestrator::new(llm);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                collection,
                documents,
                collections,
                pipeline,
                retrieval,
                generation,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn collection(&self) -> &CollectionSpec {
        &self.inner.collection
    }

    pub fn documents(&self) -> &Arc<dyn DocumentStoreProvider> {
        &self.inner.documents
    }

    pub fn collections(&self) -> &Arc<CollectionLifecycleManager> {
        &self.inner.collections
    }

    pub fn vector_db(&self) -> &Arc<dyn VectorDatabase> {
        self.inner.collections.database()
    }

    pub fn pipeline(&self) -> &UploadPipeline {
        &self.inner.pipeline
    }

    pub fn retrieval(&self) -> &RetrievalOrchestrator {
        &self.inner.retrieval
    }

    pub fn generation(&self) -> &GenerationOrchestrator {
        &self.inner.generation
    }
}
