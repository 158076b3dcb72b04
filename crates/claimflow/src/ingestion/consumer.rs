//! The single background loop that drains the extraction queue.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures_util::FutureExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info_span, Instrument};

use crate::db::entities::invoice::{self, is_blank};
use crate::db::invoice_repo::{self, ExtractedFieldsUpdate};
use crate::db::Database;
use crate::error::IngestionError;
use crate::ingestion::extractor::{ExtractedFields, FieldExtractor};
use crate::ingestion::queue::{ExtractionQueue, ExtractionRequest};

/// What processing one request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    InvoiceMissing,
    /// Every extractable field already had a value.
    AlreadyComplete,
    Filled(usize),
}

/// Keeps only the extracted values whose invoice field is still empty.
pub fn fill_missing(invoice: &invoice::Model, extracted: ExtractedFields) -> ExtractedFieldsUpdate {
    ExtractedFieldsUpdate {
        company_name: extracted
            .company_name
            .filter(|_| is_blank(&invoice.company_name)),
        amount: extracted.amount.filter(|_| is_blank(&invoice.amount)),
        currency: extracted.currency.filter(|_| is_blank(&invoice.currency)),
        invoice_date: extracted
            .invoice_date
            .filter(|_| invoice.invoice_date.is_none()),
        description: extracted
            .description
            .filter(|_| is_blank(&invoice.description)),
    }
}

fn field_count(update: &ExtractedFieldsUpdate) -> usize {
    [
        update.company_name.is_some(),
        update.amount.is_some(),
        update.currency.is_some(),
        update.invoice_date.is_some(),
        update.description.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count()
}

pub struct ExtractionConsumer {
    db: Database,
    queue: Arc<ExtractionQueue>,
    extractor: Arc<dyn FieldExtractor>,
}

impl ExtractionConsumer {
    pub fn new(
        db: Database,
        queue: Arc<ExtractionQueue>,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Self {
        Self {
            db,
            queue,
            extractor,
        }
    }

    /// Runs the loop on the current runtime until shutdown.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Processes requests until the shutdown signal fires (or its sender is
    /// dropped) or the queue is closed and drained.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        log::info!(
            "Extraction consumer started ({} extractor, capacity {})",
            self.extractor.name(),
            self.queue.capacity()
        );

        loop {
            let request = tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    log::info!("Extraction consumer received shutdown signal");
                    break;
                }
                request = self.queue.dequeue() => match request {
                    Some(request) => request,
                    None => {
                        log::info!("Extraction queue closed");
                        break;
                    }
                },
            };

            self.process_guarded(request).await;
        }

        log::info!(
            "Extraction consumer stopped ({} pending, {} dropped)",
            self.queue.len(),
            self.queue.dropped_count()
        );
    }

    /// Processes one request, logging instead of propagating any failure or
    /// panic.
    async fn process_guarded(&self, request: ExtractionRequest) {
        let span = info_span!("extract_invoice", invoice_id = request.invoice_id);
        let result = AssertUnwindSafe(self.process(request).instrument(span))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(ExtractionOutcome::Filled(count))) => {
                log::info!("Filled {} field(s) of invoice {}", count, request.invoice_id);
            }
            Ok(Ok(ExtractionOutcome::AlreadyComplete)) => {
                log::debug!("Invoice {} needs no extraction", request.invoice_id);
            }
            Ok(Ok(ExtractionOutcome::InvoiceMissing)) => {
                log::debug!("Invoice {} no longer exists, skipping", request.invoice_id);
            }
            Ok(Err(e)) => log::error!("{}", e),
            Err(_) => log::error!("{}", IngestionError::Panicked(request.invoice_id)),
        }
    }

    /// Extracts and persists the empty fields of one invoice.
    pub async fn process(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionOutcome, IngestionError> {
        let Some(invoice) = invoice_repo::find_by_id(self.db.conn(), request.invoice_id).await?
        else {
            return Ok(ExtractionOutcome::InvoiceMissing);
        };
        if invoice.missing_extracted_fields().is_empty() {
            return Ok(ExtractionOutcome::AlreadyComplete);
        }

        let extracted = self.extractor.extract(&invoice).await?;

        // Re-read inside the transaction so values written during extraction
        // are not overwritten.
        let txn = self.db.begin().await?;
        let Some(current) = invoice_repo::find_by_id(&txn, request.invoice_id).await? else {
            return Ok(ExtractionOutcome::InvoiceMissing);
        };
        let update = fill_missing(&current, extracted);
        if update.is_empty() {
            return Ok(ExtractionOutcome::AlreadyComplete);
        }

        invoice_repo::update_extracted_fields(&txn, current.id, &update, Utc::now()).await?;
        txn.commit().await?;

        Ok(ExtractionOutcome::Filled(field_count(&update)))
    }
}
