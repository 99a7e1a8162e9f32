//! Error types for the RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No loader is registered for the file's extension
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Document body could not be loaded
    #[error("Failed to load file '{filename}': {message}")]
    Load { filename: String, message: String },

    /// Splitter rejected its input or parameters
    #[error("Chunking failed: {0}")]
    Chunk(String),

    /// Embedding service error
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// Generative completion service error
    #[error("Generation service error: {0}")]
    Generation(String),

    /// Vector database error (create/delete/upsert/query)
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a load error for a file
    pub fn load(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a chunking error
    pub fn chunk(message: impl Into<String>) -> Self {
        Self::Chunk(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a vector store error
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::Load { .. } => "load_error",
            Error::Chunk(_) => "chunk_error",
            Error::Embedding(_) => "embedding_service_error",
            Error::Generation(_) => "generation_service_error",
            Error::VectorStore(_) => "vector_store_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!(code = self.code(), "request failed: {}", self);

        // Clients only ever see an opaque message
        let body = Json(json!({ "detail": self.to_string() }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
