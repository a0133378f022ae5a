use axum::{extract::State, Json};

use crate::config::ChunkingConfig;
use crate::dto::chunk::{ChunkPreviewRequest, ChunkPreviewResponse};
use crate::errors::AppError;
use crate::services::chunking::{chunk_text, chunk_text_by_pages};
use crate::state::AppState;

/// Runs the chunker on posted text without storing anything.
pub async fn preview(
    State(state): State<AppState>,
    Json(payload): Json<ChunkPreviewRequest>,
) -> Result<Json<ChunkPreviewResponse>, AppError> {
    let options = ChunkingConfig {
        chunk_size: Some(payload.chunk_size.unwrap_or(state.chunk_options.chunk_size)),
        overlap: Some(payload.overlap.unwrap_or(state.chunk_options.overlap)),
    }
    .resolve()
    .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = match (payload.text, payload.pages) {
        (Some(text), None) => ChunkPreviewResponse::Text {
            chunks: chunk_text(&text, &options),
        },
        (None, Some(pages)) => ChunkPreviewResponse::Pages {
            chunks: chunk_text_by_pages(&pages, &options),
        },
        _ => {
            return Err(AppError::Validation(
                "Provide exactly one of `text` or `pages`".to_string(),
            ));
        }
    };

    Ok(Json(response))
}
