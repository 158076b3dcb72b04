use thiserror::Error;

use claimflow::{ConfigError, DatabaseError, WorkflowError};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),

    #[error("{count} invoice(s) have a stale cached status")]
    InconsistentStatus { count: usize },
}
