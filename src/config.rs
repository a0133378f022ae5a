use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::chunking::{ChunkOptions, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    pub upload: UploadConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

/// Raw chunking settings; unset fields fall back to the chunker defaults in
/// [`ChunkingConfig::resolve`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChunkingConfig {
    pub chunk_size: Option<usize>,
    pub overlap: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub enabled: bool,
    pub max_file_size_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    pub context_chunk_limit: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            context_chunk_limit: 10,
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl ChunkingConfig {
    /// Fills in defaults and rejects settings the chunker cannot make
    /// progress with.
    pub fn resolve(&self) -> Result<ChunkOptions, ConfigError> {
        let options = ChunkOptions::new(
            self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            self.overlap.unwrap_or(DEFAULT_OVERLAP),
        );

        if options.chunk_size == 0 {
            return Err(ConfigError::Message(
                "chunking.chunk_size must be positive".to_string(),
            ));
        }
        if options.overlap >= options.chunk_size {
            return Err(ConfigError::Message(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                options.overlap, options.chunk_size
            )));
        }

        Ok(options)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = AppConfig::load();
        assert!(config.is_ok(), "Default config should load: {config:?}");

        let config = config.unwrap();
        assert!(config.upload.enabled);
        assert_eq!(config.upload.max_file_size_mb, 50);
        assert_eq!(config.retrieval.context_chunk_limit, 10);
        assert_eq!(config.chunking.resolve().unwrap(), ChunkOptions::default());
    }

    #[test]
    fn test_env_override() {
        // SAFETY: no other test reads or writes APP__SERVER__PORT.
        unsafe { std::env::set_var("APP__SERVER__PORT", "8080") };

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 8080);

        unsafe { std::env::remove_var("APP__SERVER__PORT") };
    }

    #[test]
    fn test_max_file_size_bytes() {
        let upload = UploadConfig {
            enabled: true,
            max_file_size_mb: 5,
        };
        assert_eq!(upload.max_file_size_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn test_chunking_defaults_fill_missing_fields() {
        let partial = ChunkingConfig {
            chunk_size: Some(400),
            overlap: None,
        };
        assert_eq!(partial.resolve().unwrap(), ChunkOptions::new(400, 200));
        assert_eq!(
            ChunkingConfig::default().resolve().unwrap(),
            ChunkOptions::new(1000, 200)
        );
    }

    #[test]
    fn test_chunking_rejects_degenerate_sizes() {
        let zero = ChunkingConfig {
            chunk_size: Some(0),
            overlap: Some(0),
        };
        assert!(zero.resolve().is_err());

        let overlap_too_big = ChunkingConfig {
            chunk_size: Some(100),
            overlap: Some(100),
        };
        let err = overlap_too_big.resolve().unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }
}
