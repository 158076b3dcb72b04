//! Field extraction seam and the placeholder extractor used until a real one is wired in.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::db::entities::invoice;
use crate::error::IngestionError;

pub const PLACEHOLDER_COMPANY: &str = "Unknown Company (extracted)";
pub const PLACEHOLDER_AMOUNT: &str = "0.00";
pub const PLACEHOLDER_CURRENCY: &str = "EUR";
pub const PLACEHOLDER_DESCRIPTION: &str = "Automatically extracted from the uploaded document.";

/// Values read from an invoice document. A field the extractor could not
/// determine is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub company_name: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Reads claim fields out of an uploaded invoice.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, invoice: &invoice::Model) -> Result<ExtractedFields, IngestionError>;

    fn name(&self) -> &'static str;
}

/// Stand-in for a real OCR pipeline: waits, then returns fixed placeholders
/// and the extraction day as invoice date.
#[derive(Debug, Clone)]
pub struct PlaceholderExtractor {
    delay: Duration,
}

impl PlaceholderExtractor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn placeholders(today: NaiveDate) -> ExtractedFields {
        ExtractedFields {
            company_name: Some(PLACEHOLDER_COMPANY.to_string()),
            amount: Some(PLACEHOLDER_AMOUNT.to_string()),
            currency: Some(PLACEHOLDER_CURRENCY.to_string()),
            invoice_date: Some(today),
            description: Some(PLACEHOLDER_DESCRIPTION.to_string()),
        }
    }
}

impl Default for PlaceholderExtractor {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl FieldExtractor for PlaceholderExtractor {
    async fn extract(&self, invoice: &invoice::Model) -> Result<ExtractedFields, IngestionError> {
        log::debug!(
            "Simulating extraction of {} for invoice {}",
            invoice.file_path,
            invoice.id
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::placeholders(Utc::now().date_naive()))
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::stage::PrimaryStatus;

    fn invoice() -> invoice::Model {
        let now = Utc::now();
        invoice::Model {
            id: 1,
            user_id: 1,
            file_path: "/uploads/a.pdf".to_string(),
            power_of_attorney_path: None,
            company_name: None,
            amount: None,
            currency: None,
            invoice_date: None,
            description: None,
            ticket_number: "CF-1".to_string(),
            stage_id: 1,
            primary_status: PrimaryStatus::Submitted,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_placeholder_values() {
        let extractor = PlaceholderExtractor::new(Duration::ZERO);
        let fields = extractor.extract(&invoice()).await.unwrap();
        assert_eq!(fields.company_name.as_deref(), Some(PLACEHOLDER_COMPANY));
        assert_eq!(fields.amount.as_deref(), Some("0.00"));
        assert_eq!(fields.currency.as_deref(), Some("EUR"));
        assert_eq!(fields.invoice_date, Some(Utc::now().date_naive()));
        assert_eq!(fields.description.as_deref(), Some(PLACEHOLDER_DESCRIPTION));
        assert_eq!(extractor.name(), "placeholder");
    }

    #[tokio::test]
    async fn test_placeholder_delay() {
        let extractor = PlaceholderExtractor::new(Duration::from_millis(50));
        let start = std::time::Instant::now();
        extractor.extract(&invoice()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
