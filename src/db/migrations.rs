use anyhow::{Context, Result};
use sqlx::PgPool;

pub async fn run_all(pool: &PgPool) -> Result<()> {
    create_documents_table(pool).await?;
    create_document_chunks_table(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn create_documents_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes BIGINT NOT NULL,
            data BYTEA NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('processing', 'ready', 'failed')),
            error_message TEXT,
            page_count INTEGER,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            processed_at TIMESTAMPTZ
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create documents table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(created_at DESC)")
        .execute(pool)
        .await
        .context("Failed to create documents index")?;

    Ok(())
}

async fn create_document_chunks_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS document_chunks (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            chunk_index INTEGER NOT NULL,
            page_number INTEGER NOT NULL,
            start_index INTEGER NOT NULL,
            end_index INTEGER NOT NULL,
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE(document_id, chunk_index)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create document_chunks table")?;

    Ok(())
}
