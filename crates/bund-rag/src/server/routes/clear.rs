//! Reset endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::ClearResponse;

/// POST /clear - Delete uploaded files and recreate the collection empty
pub async fn clear_all(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.documents().clear().await?;
    tracing::info!("Deleted {} uploaded files", removed);

    state.collections().clear(state.collection()).await?;

    Ok(Json(ClearResponse {
        message: format!(
            "Successfully cleared files and {} collection",
            state.vector_db().name()
        ),
    }))
}
