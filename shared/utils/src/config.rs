use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::recon::reconciler::DEFAULT_KEY_PATTERN;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub reference: ReferenceConfig,
    pub reconciliation: ReconciliationSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_file_size: u64,
    pub retention_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Master reference dataset (.xlsx, .xls or .csv).
    pub path: PathBuf,
}

/// Tunables for the reconciliation pass. These become the immutable
/// extractor/reconciler configs at construction time; nothing reads them
/// as global state mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationSettings {
    /// Part numbers must match this pattern or the row is flagged.
    pub key_pattern: String,
    /// Absolute tolerance when both compared values parse as numbers.
    pub numeric_tolerance: f64,
    /// Attributes to compare against the reference. `None` compares every
    /// attribute the reference entry carries.
    pub tracked_fields: Option<Vec<String>>,
    /// Extra `{synonym: canonical_name}` header mappings, merged over the
    /// built-in table.
    pub column_synonyms: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with BOMLINE prefix
            .add_source(Environment::with_prefix("BOMLINE").separator("__"));

        config.build()?.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 16 * 1024 * 1024, // 16MB
                timeout_seconds: 30,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("storage/uploads"),
                max_file_size: 50 * 1024 * 1024, // 50MB
                retention_days: 7,
            },
            reference: ReferenceConfig {
                path: PathBuf::from("data/master_bom.xlsx"),
            },
            reconciliation: ReconciliationSettings::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
        }
    }
}

impl Default for ReconciliationSettings {
    fn default() -> Self {
        Self {
            key_pattern: DEFAULT_KEY_PATTERN.to_string(),
            numeric_tolerance: 1e-6,
            tracked_fields: None,
            column_synonyms: HashMap::new(),
        }
    }
}
