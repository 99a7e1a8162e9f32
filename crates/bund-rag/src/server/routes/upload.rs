//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{UploadResponse, UploadedFile};

/// POST /upload - Ingest a multipart list of files
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::Internal(format!("Failed to read multipart field: {}", e))
    })? {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            tracing::debug!("Ignoring non-file field {:?}", field.name());
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            Error::Internal(format!("Failed to read file {}: {}", filename, e))
        })?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data.to_vec()));
    }

    let report = state.pipeline().upload(files).await?;

    tracing::info!(
        "Upload of {} file(s) finished in {}ms",
        report.files,
        start.elapsed().as_millis()
    );

    Ok(Json(UploadResponse {
        message: report.message(),
    }))
}
