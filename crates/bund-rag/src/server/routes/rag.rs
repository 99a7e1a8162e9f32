//! Question answering endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{RagRequest, RagResponse};

/// POST /rag - Retrieve context and generate an answer
pub async fn answer_query(
    State(state): State<AppState>,
    Json(request): Json<RagRequest>,
) -> Result<Json<RagResponse>> {
    let start = Instant::now();

    tracing::info!("Query: \"{}\"", request.user_query);

    let contexts = state
        .retrieval()
        .retrieve(&request.user_query, state.config().retrieval.top_k)
        .await?;

    let answer = state.generation().answer(&request.user_query, contexts).await?;

    tracing::info!(
        "Answered with {} contexts in {}ms",
        answer.contexts.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(RagResponse {
        response: answer.text,
    }))
}
