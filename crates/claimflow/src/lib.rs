pub mod config;
pub mod db;
pub mod error;
pub mod ingestion;
pub mod workflow;

pub use config::{load_config, load_or_default, AppConfig};
pub use db::entities::stage::PrimaryStatus;
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, IngestionError, Missing, WorkflowError};
pub use ingestion::{ExtractionConsumer, ExtractionQueue, ExtractionRequest, PlaceholderExtractor};
pub use workflow::{Actor, Culture, StageChange, StageDefinition};
