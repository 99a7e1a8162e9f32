//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

use bund_rag::config::RagConfig;
use bund_rag::error::{Error, Result};
use bund_rag::providers::local::LocalDocumentStore;
use bund_rag::providers::memory::InMemoryVectorDb;
use bund_rag::providers::{EmbeddingProvider, LlmProvider, VectorDatabase};
use bund_rag::server::state::AppState;

/// Embeds text as keyword counts plus a constant bias axis
///
/// Texts mentioning a keyword score cosine 1.0 against a query made of that
/// keyword alone; texts without it score about 0.71.
pub struct KeywordEmbedder {
    keywords: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(keywords: Vec<&'static str>) -> Self {
        Self { keywords }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| lower.matches(k).count() as f32)
            .collect();
        vector.push(1.0);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.keywords.len() + 1
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keywords"
    }
}

/// Embedder that always fails
pub struct DownEmbedder;

#[async_trait]
impl EmbeddingProvider for DownEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("connection refused"))
    }

    fn dimensions(&self) -> usize {
        4
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "down"
    }
}

/// LLM that records every prompt and answers with a fixed text
#[derive(Default)]
pub struct RecordingLlm {
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingLlm {
    pub const ANSWER: &'static str = "Recorded answer.";

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(Self::ANSWER.to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "fake-1"
    }
}

pub const KEYWORDS: [&str; 3] = ["lighthouse", "harbour", "bakery"];

/// A fully wired state over fakes; keep the `TempDir` alive for the test
pub struct Harness {
    pub state: AppState,
    pub db: Arc<InMemoryVectorDb>,
    pub llm: Arc<RecordingLlm>,
    pub upload_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut RagConfig)) -> Self {
        let embedder = Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec()));
        Self::build(embedder, customize)
    }

    pub fn build(embedder: Arc<dyn EmbeddingProvider>, customize: impl FnOnce(&mut RagConfig)) -> Self {
        let upload_dir = TempDir::new().unwrap();

        let mut config = RagConfig::default();
        config.embeddings.dimensions = KEYWORDS.len() + 1;
        config.upload.dir = upload_dir.path().to_path_buf();
        config.vector_db.collection = "test_collection".to_string();
        customize(&mut config);

        let db = Arc::new(InMemoryVectorDb::new());
        let llm = Arc::new(RecordingLlm::default());
        let documents = Arc::new(LocalDocumentStore::new(config.upload.dir.clone()).unwrap());

        let state = AppState::from_parts(config, embedder, llm.clone(), db.clone(), documents).unwrap();

        Self {
            state,
            db,
            llm,
            upload_dir,
        }
    }

    /// Points in the test collection, 0 if it does not exist
    pub async fn stored_points(&self) -> usize {
        let name = &self.state.collection().name;
        if self.db.collection_exists(name).await.unwrap() {
            self.db.count(name).await.unwrap()
        } else {
            0
        }
    }

    pub fn uploaded_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

/// One 999-character Markdown paragraph of 40-character sentences with the
/// lighthouse sentence at position 15
pub fn long_paragraph() -> String {
    let sentences: Vec<String> = (0..25)
        .map(|i| {
            if i == 15 {
                "The lighthouse keeper counted the ship. ".to_string()
            } else {
                format!("Filler sentence {:02} says nothing at all. ", i)
            }
        })
        .collect();
    sentences.concat()
}
