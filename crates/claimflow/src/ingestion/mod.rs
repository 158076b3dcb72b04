//! Background field extraction for freshly submitted invoices.

pub mod consumer;
pub mod extractor;
pub mod queue;

pub use consumer::{fill_missing, ExtractionConsumer, ExtractionOutcome};
pub use extractor::{ExtractedFields, FieldExtractor, PlaceholderExtractor};
pub use queue::{ExtractionQueue, ExtractionRequest, QueueStats};
