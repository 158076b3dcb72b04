use std::path::{Path, PathBuf};

use crate::config::schema::AppConfig;
use crate::error::ConfigError;
use crate::workflow::localization::Culture;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: AppConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads `explicit` when given, else the per-user config file when it
/// exists, else built-in defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            log::info!("Loading configuration from {}", path.display());
            load_config(path)
        }
        _ => {
            log::info!("No configuration file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Returns the canonical config path: `~/.claimflow/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claimflow").join("config.json"))
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if Culture::parse(&config.default_culture).is_none() {
        return Err(ConfigError::UnknownCulture(config.default_culture.clone()));
    }

    if config.ingestion.queue_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "ingestion.queue_capacity must be at least 1".to_string(),
        });
    }

    if let Some(url) = &config.database_url {
        let supported = ["sqlite:", "postgres://", "postgresql://"];
        if !supported.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(ConfigError::Validation {
                message: format!("Unsupported database URL scheme: {}", url),
            });
        }
    }

    Ok(())
}

impl AppConfig {
    /// The configured database URL, or the per-user SQLite file.
    pub fn resolved_database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }
        crate::db::default_database_path()
            .map(|path| crate::db::sqlite_url(&path))
            .ok_or_else(|| ConfigError::Validation {
                message: "No database_url configured and no home directory found".to_string(),
            })
    }

    pub fn culture(&self) -> Culture {
        Culture::parse(&self.default_culture).unwrap_or_default()
    }
}
