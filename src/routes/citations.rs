use axum::Json;

use crate::dto::chunk::{CitationRequest, CitationResponse};
use crate::errors::AppError;
use crate::services::citation::parse_citation;

/// Resolves the page an assistant answer cites, for jumping the viewer there.
pub async fn resolve(
    Json(payload): Json<CitationRequest>,
) -> Result<Json<CitationResponse>, AppError> {
    let citation = parse_citation(&payload.answer)
        .ok_or_else(|| AppError::NotFound("Answer does not cite a page".to_string()))?;

    Ok(Json(CitationResponse {
        page_number: citation.page_number,
        page_index: citation.page_index(),
        query: citation.viewer_query(),
        source_text: citation.source_text,
        search_text: citation.search_text,
    }))
}
