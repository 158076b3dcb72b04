use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Unknown culture '{0}'")]
    UnknownCulture(String),
}

/// Which kind of record a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Invoice,
    Stage,
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Invoice => write!(f, "invoice"),
            Missing::Stage => write!(f, "stage"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{kind} {id} not found")]
    NotFound { kind: Missing, id: i32 },

    #[error("No stages are defined")]
    EmptyCatalog,

    #[error("Invalid stage definition: {0}")]
    Validation(String),

    #[error("A stage with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("Stage {stage_id} is in use by {invoices} invoice(s) and {history} history entries")]
    InUse {
        stage_id: i32,
        invoices: u64,
        history: u64,
    },

    #[error("Invoice {invoice_id} was modified concurrently (expected version {expected})")]
    Conflict { invoice_id: i32, expected: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl WorkflowError {
    pub fn invoice_not_found(id: i32) -> Self {
        Self::NotFound {
            kind: Missing::Invoice,
            id,
        }
    }

    pub fn stage_not_found(id: i32) -> Self {
        Self::NotFound {
            kind: Missing::Stage,
            id,
        }
    }

    /// Business-rule failures are reported to callers with a success flag
    /// rather than as a hard error.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_)
                | WorkflowError::DuplicateSlug(_)
                | WorkflowError::InUse { .. }
                | WorkflowError::EmptyCatalog
        )
    }
}

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Extraction failed for invoice {invoice_id}: {reason}")]
    ExtractionFailed { invoice_id: i32, reason: String },

    #[error("Extraction for invoice {0} panicked")]
    Panicked(i32),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}
