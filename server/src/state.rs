use std::sync::Arc;

use claimflow::{AppConfig, Culture, Database, ExtractionQueue, ExtractionRequest};

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub queue: Arc<ExtractionQueue>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, queue: Arc<ExtractionQueue>, config: Arc<AppConfig>) -> Self {
        Self { db, queue, config }
    }

    pub fn default_culture(&self) -> Culture {
        self.config.culture()
    }

    /// Queues field extraction for a new invoice when ingestion is enabled.
    pub fn request_extraction(&self, invoice_id: i32) {
        if self.config.ingestion.enabled {
            self.queue.enqueue(ExtractionRequest { invoice_id });
        }
    }
}
