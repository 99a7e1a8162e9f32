//! bund-rag: document ingestion and retrieval-augmented answering
//!
//! Uploaded files (JSON, PDF, HTML, Word, Markdown, text) are loaded into text
//! segments, split into overlapping chunks, embedded with Ollama and stored in
//! a Qdrant collection. Questions are embedded, matched against the collection
//! and answered by an LLM from the retrieved context.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, DocumentFormat, SegmentSource, TextSegment, UploadedFile},
    query::RagRequest,
    response::{Answer, RetrievedContext, ScoredContext},
};
