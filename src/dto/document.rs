use serde::Serialize;

use crate::db::models::document::{Document, DocumentStatus};

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
    pub page_count: Option<i32>,
    pub url: String,
    pub created_at: String,
    pub processed_at: Option<String>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            url: format!("/api/documents/{}/file", doc.id),
            id: doc.id,
            filename: doc.filename,
            content_type: doc.content_type,
            size_bytes: doc.size_bytes,
            status: doc.status,
            error_message: doc.error_message,
            page_count: doc.page_count,
            created_at: doc.created_at,
            processed_at: doc.processed_at,
        }
    }
}
