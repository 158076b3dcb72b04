use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-wide settings, built once at startup and passed to whatever
/// needs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: String,
    /// SeaORM connection URL. Defaults to the per-user SQLite file.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_culture")]
    pub default_culture: String,
    #[serde(default = "default_true")]
    pub seed_default_stages: bool,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_url: None,
            default_culture: default_culture(),
            seed_default_stages: true,
            server: ServerConfig::default(),
            ingestion: IngestionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_culture() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pending extraction requests kept before the oldest is dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Simulated extraction latency per invoice.
    #[serde(default = "default_extraction_delay_ms")]
    pub extraction_delay_ms: u64,
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_extraction_delay_ms() -> u64 {
    1500
}

impl IngestionConfig {
    pub fn extraction_delay(&self) -> Duration {
        Duration::from_millis(self.extraction_delay_ms)
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: default_queue_capacity(),
            extraction_delay_ms: default_extraction_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
