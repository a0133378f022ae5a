use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::dto::chunk::{ChunksQuery, DocumentChunksResponse};
use crate::dto::document::DocumentResponse;
use crate::errors::AppError;
use crate::services::pdf;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, AppError> {
    if !state.config.upload.enabled {
        return Err(AppError::FeatureDisabled("PDF upload".to_string()));
    }

    let field = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart data: {e}")))?
            .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
        if field.name() == Some(FILE_FIELD) {
            break field;
        }
    };

    let filename = field.file_name().unwrap_or("unnamed.pdf").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    if !pdf::is_pdf(&content_type, &filename) {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;

    let max_size = state.config.upload.max_file_size_bytes();
    if data.len() > max_size {
        return Err(AppError::Validation(format!(
            "File too large. Maximum size is {} MB",
            state.config.upload.max_file_size_mb
        )));
    }
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let doc = state
        .document_repo
        .create(&filename, pdf::PDF_MIME_TYPE, &data)
        .await?;
    tracing::info!("Stored document {} ({filename}, {} bytes)", doc.id, doc.size_bytes);

    state.ingest.spawn(doc.id.clone(), data.to_vec());

    Ok(Json(doc.into()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let docs = state.document_repo.list().await?;
    Ok(Json(docs.into_iter().map(|d| d.into()).collect()))
}

pub async fn latest(State(state): State<AppState>) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state
        .document_repo
        .find_latest()
        .await?
        .ok_or_else(|| AppError::NotFound("No PDF found. Please upload a PDF first.".to_string()))?;

    Ok(Json(doc.into()))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state
        .document_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(doc.into()))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.document_repo.delete(&id).await? {
        return Err(AppError::NotFound("Document not found".to_string()));
    }

    tracing::info!("Deleted document {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Serves the stored PDF inline so a browser viewer can render it.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let file = state
        .document_repo
        .load_file(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let disposition = format!("inline; filename=\"{}\"", file.filename.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CACHE_CONTROL,
                "private, max-age=0, must-revalidate".to_string(),
            ),
        ],
        file.data,
    )
        .into_response())
}

/// First `limit` chunks of a document in document order; the bounded
/// prefix a chat client feeds to the model as context.
pub async fn list_chunks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChunksQuery>,
) -> Result<Json<DocumentChunksResponse>, AppError> {
    let limit = query
        .limit
        .unwrap_or(state.config.retrieval.context_chunk_limit);
    if limit < 1 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    if state.document_repo.find_by_id(&id).await?.is_none() {
        return Err(AppError::NotFound("Document not found".to_string()));
    }

    let chunks = state.chunk_repo.find_by_document(&id, limit).await?;
    let total = state.chunk_repo.count_by_document(&id).await?;

    Ok(Json(DocumentChunksResponse {
        document_id: id,
        total,
        chunks,
    }))
}
