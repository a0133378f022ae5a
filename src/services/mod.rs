pub mod chunking;
pub mod citation;
pub mod ingest;
pub mod pdf;
