//! Core types for the RAG service

pub mod document;
pub mod query;
pub mod response;

pub use document::{
    Chunk, Document, DocumentFormat, SegmentSource, TextSegment, UploadedFile,
};
pub use query::RagRequest;
pub use response::{
    Answer, ClearResponse, RagResponse, RetrievedContext, ScoredContext, UploadResponse,
};
