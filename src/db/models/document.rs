use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
    pub page_count: Option<i32>,
    pub created_at: String,
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Failed,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Ready => write!(f, "ready"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl TryFrom<&str> for DocumentStatus {
    type Error = anyhow::Error;
    fn try_from(value: &str) -> Result<Self> {
        match value {
            "processing" => Ok(DocumentStatus::Processing),
            "ready" => Ok(DocumentStatus::Ready),
            "failed" => Ok(DocumentStatus::Failed),
            other => Err(anyhow::anyhow!("Invalid document status: {other}")),
        }
    }
}

/// Stored PDF bytes with the metadata needed to serve them back.
pub struct DocumentFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

const SELECT_COLUMNS: &str = "SELECT id, filename, content_type, size_bytes, status, error_message, page_count,
        to_char(created_at, 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS created_at,
        to_char(processed_at, 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS processed_at
 FROM documents";

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    /// Stores an uploaded file. New documents start out `processing`.
    pub async fn create(&self, filename: &str, content_type: &str, data: &[u8]) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();
        let size_bytes = data.len() as i64;

        sqlx::query(
            "INSERT INTO documents (id, filename, content_type, size_bytes, data, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(filename)
        .bind(content_type)
        .bind(size_bytes)
        .bind(data)
        .bind(DocumentStatus::Processing.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert document")?;

        Ok(Document {
            id,
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
            status: DocumentStatus::Processing,
            error_message: None,
            page_count: None,
            created_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            processed_at: None,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query document")?;

        row.map(|r| Self::map_row(&r)).transpose()
    }

    pub async fn find_latest(&self) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT 1"))
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query latest document")?;

        row.map(|r| Self::map_row(&r)).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list documents")?;

        rows.iter().map(Self::map_row).collect()
    }

    pub async fn load_file(&self, id: &str) -> Result<Option<DocumentFile>> {
        let row = sqlx::query("SELECT filename, content_type, data FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load document data")?;

        row.map(|r| {
            Ok(DocumentFile {
                filename: r.try_get("filename").context("Failed to get filename")?,
                content_type: r.try_get("content_type").context("Failed to get content_type")?,
                data: r.try_get("data").context("Failed to get data")?,
            })
        })
        .transpose()
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: &DocumentStatus,
        error_message: Option<&str>,
        page_count: Option<i32>,
    ) -> Result<()> {
        let processed_at = (*status != DocumentStatus::Processing).then(chrono::Utc::now);

        sqlx::query(
            "UPDATE documents SET status = $1, error_message = $2, page_count = $3, processed_at = $4
             WHERE id = $5",
        )
        .bind(status.to_string())
        .bind(error_message)
        .bind(page_count)
        .bind(processed_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update document status")?;

        Ok(())
    }

    /// Deletes the document; its chunks go with it through the cascade.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;

        Ok(result.rows_affected() > 0)
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Result<Document> {
        let status_str: String = row.try_get("status").context("Failed to get status")?;
        let status = DocumentStatus::try_from(status_str.as_str())?;

        Ok(Document {
            id: row.try_get("id").context("Failed to get id")?,
            filename: row.try_get("filename").context("Failed to get filename")?,
            content_type: row
                .try_get("content_type")
                .context("Failed to get content_type")?,
            size_bytes: row.try_get("size_bytes").context("Failed to get size_bytes")?,
            status,
            error_message: row.try_get("error_message").context("Failed to get error_message")?,
            page_count: row.try_get("page_count").context("Failed to get page_count")?,
            created_at: row.try_get("created_at").context("Failed to get created_at")?,
            processed_at: row
                .try_get("processed_at")
                .context("Failed to get processed_at")?,
        })
    }
}
