use anyhow::{Context, Result};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::db::models::document::{DocumentRepository, DocumentStatus};
use crate::db::models::document_chunk::DocumentChunkRepository;
use crate::services::chunking::{chunk_text_by_pages, ChunkOptions, PageChunk};
use crate::services::pdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub page_count: usize,
    pub chunk_count: usize,
}

/// Turns stored PDF bytes into persisted page chunks.
#[derive(Clone)]
pub struct IngestService {
    documents: DocumentRepository,
    chunks: DocumentChunkRepository,
    options: ChunkOptions,
}

impl IngestService {
    pub fn new(
        documents: DocumentRepository,
        chunks: DocumentChunkRepository,
        options: ChunkOptions,
    ) -> Self {
        Self {
            documents,
            chunks,
            options,
        }
    }

    /// Extracts, chunks and stores `pdf_bytes` for `document_id`, replacing
    /// any chunks stored for it before.
    pub async fn ingest(&self, document_id: &str, pdf_bytes: Vec<u8>) -> Result<IngestReport> {
        let pages = pdf::extract_pages(pdf_bytes).await?;
        let chunks = chunk_pages(&pages, &self.options)?;

        self.chunks
            .replace_for_document(document_id, &chunks)
            .await
            .with_context(|| format!("Failed to store chunks for document {document_id}"))?;

        Ok(IngestReport {
            page_count: pages.len(),
            chunk_count: chunks.len(),
        })
    }

    /// Runs [`Self::ingest`] and records the outcome on the document.
    pub async fn process(&self, document_id: &str, pdf_bytes: Vec<u8>) -> Result<IngestReport> {
        match self.ingest(document_id, pdf_bytes).await {
            Ok(report) => {
                self.documents
                    .update_status(
                        document_id,
                        &DocumentStatus::Ready,
                        None,
                        i32::try_from(report.page_count).ok(),
                    )
                    .await?;
                tracing::info!(
                    "Document {document_id} processed: {} pages, {} chunks",
                    report.page_count,
                    report.chunk_count
                );
                Ok(report)
            }
            Err(e) => {
                let msg = format!("{e:#}");
                tracing::error!("Document {document_id} processing failed: {msg}");
                self.documents
                    .update_status(document_id, &DocumentStatus::Failed, Some(&msg), None)
                    .await?;
                Err(e)
            }
        }
    }

    /// Processes the document on a background task.
    pub fn spawn(&self, document_id: String, pdf_bytes: Vec<u8>) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.process(&document_id, pdf_bytes).await {
                tracing::warn!("Background ingestion of {document_id} ended with error: {e:#}");
            }
        })
    }
}

/// Chunks extracted pages, failing when nothing in the document has text.
pub fn chunk_pages(pages: &[String], options: &ChunkOptions) -> Result<Vec<PageChunk>> {
    let chunks = chunk_text_by_pages(pages, options);
    if chunks.is_empty() {
        anyhow::bail!(
            "PDF contains no extractable text ({} pages, possibly scanned images)",
            pages.len()
        );
    }
    tracing::debug!("Chunked {} pages into {} chunks", pages.len(), chunks.len());
    Ok(chunks)
}
