use serde::{Deserialize, Serialize};

use crate::db::models::document_chunk::DocumentChunk;
use crate::services::chunking::{PageChunk, TextChunk};

#[derive(Debug, Deserialize)]
pub struct ChunksQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DocumentChunksResponse {
    pub document_id: String,
    pub total: i64,
    pub chunks: Vec<DocumentChunk>,
}

/// Either a single text or a list of pages. Unset sizes use the server's
/// configured chunking options.
#[derive(Debug, Deserialize)]
pub struct ChunkPreviewRequest {
    pub text: Option<String>,
    pub pages: Option<Vec<String>>,
    pub chunk_size: Option<usize>,
    pub overlap: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChunkPreviewResponse {
    Text { chunks: Vec<TextChunk> },
    Pages { chunks: Vec<PageChunk> },
}

#[derive(Debug, Deserialize)]
pub struct CitationRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct CitationResponse {
    pub page_number: usize,
    pub page_index: usize,
    pub source_text: String,
    pub search_text: String,
    pub query: String,
}
