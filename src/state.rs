use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::models::document::DocumentRepository;
use crate::db::models::document_chunk::DocumentChunkRepository;
use crate::services::chunking::ChunkOptions;
use crate::services::ingest::IngestService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub chunk_options: ChunkOptions,
    pub document_repo: DocumentRepository,
    pub chunk_repo: DocumentChunkRepository,
    pub ingest: IngestService,
}

impl AppState {
    /// `chunk_options` is the already-resolved form of `config.chunking`.
    pub fn new(config: AppConfig, chunk_options: ChunkOptions, pool: PgPool) -> Self {
        let document_repo = DocumentRepository::new(pool.clone());
        let chunk_repo = DocumentChunkRepository::new(pool);
        let ingest = IngestService::new(document_repo.clone(), chunk_repo.clone(), chunk_options);

        Self {
            config: Arc::new(config),
            chunk_options,
            document_repo,
            chunk_repo,
            ingest,
        }
    }
}
