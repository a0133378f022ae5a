use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::services::chunking::PageChunk;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: i32,
    pub page_number: i32,
    pub start_index: i32,
    pub end_index: i32,
    pub content: String,
}

#[derive(Clone)]
pub struct DocumentChunkRepository {
    pool: PgPool,
}

impl DocumentChunkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replaces every stored chunk of `document_id` with `chunks`, numbering
    /// them by their position so readers can restore document order.
    pub async fn replace_for_document(&self, document_id: &str, chunks: &[PageChunk]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear document chunks")?;

        for (chunk_index, chunk) in chunks.iter().enumerate() {
            sqlx::query(
                "INSERT INTO document_chunks
                     (id, document_id, chunk_index, page_number, start_index, end_index, content)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(document_id)
            .bind(to_i32(chunk_index)?)
            .bind(to_i32(chunk.page_number)?)
            .bind(to_i32(chunk.chunk.start_index)?)
            .bind(to_i32(chunk.chunk.end_index)?)
            .bind(&chunk.chunk.content)
            .execute(&mut *tx)
            .await
            .context("Failed to insert document chunk")?;
        }

        tx.commit().await.context("Failed to commit document chunks")?;
        Ok(())
    }

    /// Returns the first `limit` chunks of a document in document order.
    pub async fn find_by_document(&self, document_id: &str, limit: i64) -> Result<Vec<DocumentChunk>> {
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, page_number, start_index, end_index, content
             FROM document_chunks WHERE document_id = $1
             ORDER BY chunk_index ASC
             LIMIT $2",
        )
        .bind(document_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find chunks by document")?;

        let chunks = rows
            .iter()
            .map(|row| DocumentChunk {
                id: row.get("id"),
                document_id: row.get("document_id"),
                chunk_index: row.get("chunk_index"),
                page_number: row.get("page_number"),
                start_index: row.get("start_index"),
                end_index: row.get("end_index"),
                content: row.get("content"),
            })
            .collect();

        Ok(chunks)
    }

    pub async fn count_by_document(&self, document_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM document_chunks WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count document chunks")?;

        Ok(row.get("n"))
    }
}

fn to_i32(value: usize) -> Result<i32> {
    i32::try_from(value).with_context(|| format!("Chunk field {value} does not fit in INTEGER"))
}
