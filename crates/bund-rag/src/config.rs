//! Configuration for the RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ingestion::BatchPolicy;
use crate::providers::{CollectionSpec, DistanceMetric};

/// Main RAG service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding service configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Generative model configuration
    pub llm: LlmConfig,
    /// Vector database configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Upload handling configuration
    pub upload: UploadConfig,
}

impl RagConfig {
    /// Load configuration: optional TOML file, then `.env` / environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML configuration file; absent sections keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Override values from the process environment
    pub fn apply_env(&mut self) {
        if let Some(model) = env_var("EMBEDDING_MODEL_ID") {
            self.embeddings.model = model;
        }
        if let Some(url) = env_var("OLLAMA_URL") {
            self.embeddings.base_url = url;
        }
        if let Some(key) = env_var("API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = env_var("BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = env_var("LLM_MODEL_ID") {
            self.llm.model = model;
        }
        if let Some(url) = env_var("QDRANT_URL") {
            self.vector_db.url = url;
        }
        if let Some(name) = env_var("COLLECTION_NAME") {
            self.vector_db.collection = name;
        }
        if let Some(dir) = env_var("UPLOAD_DIR") {
            self.upload.dir = PathBuf::from(dir);
        }
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be greater than zero".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be less than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be greater than zero".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be greater than zero".to_string()));
        }
        if self.vector_db.collection.trim().is_empty() {
            return Err(Error::Config("vector_db.collection must not be empty".to_string()));
        }
        Ok(())
    }

    /// The collection every component works against
    pub fn collection_spec(&self) -> CollectionSpec {
        CollectionSpec::new(
            self.vector_db.collection.clone(),
            self.embeddings.dimensions,
            self.vector_db.distance,
        )
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Embedding service (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Output dimensions; must match the collection
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for failed requests (0 = fail fast)
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "bge-m3".to_string(), // 1024-dimensional
            dimensions: 1024,
            timeout_secs: 60,
            max_retries: 0,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

/// Which completion API to talk to
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI-compatible `/chat/completions`
    #[default]
    OpenAi,
    /// Ollama `/api/generate`
    Ollama,
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API flavour
    pub backend: LlmBackend,
    /// Base URL (OpenAI-compatible root or Ollama host)
    pub base_url: String,
    /// Bearer token for OpenAI-compatible endpoints
    pub api_key: Option<String>,
    /// Generation model name
    pub model: String,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for failed requests (0 = fail fast)
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: None,
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Vector database backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Qdrant over gRPC
    #[default]
    Qdrant,
    /// In-process store, lost on restart
    Memory,
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Backend
    pub backend: VectorBackend,
    /// Qdrant gRPC URL
    pub url: String,
    /// Collection name
    pub collection: String,
    /// Distance metric of the collection
    pub distance: DistanceMetric,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Qdrant,
            url: "http://localhost:6334".to_string(),
            collection: "bund_collection".to_string(),
            distance: DistanceMetric::Cosine,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of contexts retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 20 }
    }
}

/// Upload handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files are persisted to
    pub dir: PathBuf,
    /// What a failing file does to the rest of its batch
    pub batch_policy: BatchPolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bund-rag")
            .join("upload");

        Self {
            dir,
            batch_policy: BatchPolicy::AllOrNothing,
        }
    }
}
