//! RAG Server binary
//!
//! Run with: cargo run -p bund-rag --bin bund-rag-server -- --config bund-rag.toml

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use bund_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Document Q&A server
#[derive(Debug, Parser)]
#[command(name = "bund-rag-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "BUND_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bund_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = RagConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {} ({} dims)", config.embeddings.model, config.embeddings.dimensions);
    tracing::info!("  - LLM: {:?} / {}", config.llm.backend, config.llm.model);
    tracing::info!("  - Vector DB: {:?} / {}", config.vector_db.backend, config.vector_db.collection);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    let server = RagServer::new(config).await.context("initializing server")?;

    tracing::info!("Endpoints:");
    tracing::info!("  POST /upload - Upload documents (multipart)");
    tracing::info!("  POST /rag    - Ask a question");
    tracing::info!("  POST /clear  - Delete uploads and reset the collection");
    tracing::info!("  GET  /health - Liveness");

    server.start().await?;

    Ok(())
}
