//! Invoice submission, lookup, deletion and attached documents.

use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::db::entities::{client_document, invoice, stage, stage_history};
use crate::db::invoice_repo::InvoiceFilter;
use crate::db::{document_repo, history_repo, invoice_repo, stage_repo, Database};
use crate::error::WorkflowError;
use crate::workflow::transition::{record_transition, Actor};

/// Fields supplied when an invoice is uploaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewInvoice {
    pub user_id: i32,
    pub file_path: String,
    #[serde(default)]
    pub power_of_attorney_path: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    /// Entry stage. Defaults to the first stage of the catalog.
    #[serde(default)]
    pub stage_id: Option<i32>,
}

impl NewInvoice {
    pub fn new(user_id: i32, file_path: impl Into<String>) -> Self {
        Self {
            user_id,
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn in_stage(mut self, stage_id: i32) -> Self {
        self.stage_id = Some(stage_id);
        self
    }
}

/// One page of a listing plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePage {
    pub items: Vec<invoice::Model>,
    pub total: u64,
}

/// An invoice with everything a detail view shows.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub invoice: invoice::Model,
    pub stage: Option<stage::Model>,
    pub history: Vec<stage_history::Model>,
    pub documents: Vec<client_document::Model>,
}

/// Generates a human-friendly unique ticket number, e.g. `CF-20240301-9F3A12BC`.
pub fn generate_ticket_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "CF-{}-{}",
        Utc::now().format("%Y%m%d"),
        suffix[..8].to_ascii_uppercase()
    )
}

fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Creates an invoice in its entry stage and logs the initial ledger row.
pub async fn submit_invoice(
    db: &Database,
    new_invoice: NewInvoice,
    actor: &Actor,
) -> Result<invoice::Model, WorkflowError> {
    let span = info_span!("submit_invoice", user_id = new_invoice.user_id);
    async move {
        let file_path = new_invoice.file_path.trim().to_string();
        if file_path.is_empty() {
            return Err(WorkflowError::Validation(
                "Invoice file path must not be empty".to_string(),
            ));
        }

        let txn = db.begin().await?;

        let entry_stage = match new_invoice.stage_id {
            Some(id) => stage_repo::find_by_id(&txn, id)
                .await?
                .ok_or_else(|| WorkflowError::stage_not_found(id))?,
            None => stage_repo::first(&txn)
                .await?
                .ok_or(WorkflowError::EmptyCatalog)?,
        };

        let now = Utc::now();
        let created = invoice_repo::insert(
            &txn,
            invoice::ActiveModel {
                user_id: Set(new_invoice.user_id),
                file_path: Set(file_path),
                power_of_attorney_path: Set(text(new_invoice.power_of_attorney_path)),
                company_name: Set(text(new_invoice.company_name)),
                amount: Set(text(new_invoice.amount)),
                currency: Set(text(new_invoice.currency)),
                invoice_date: Set(new_invoice.invoice_date),
                description: Set(text(new_invoice.description)),
                ticket_number: Set(generate_ticket_number()),
                stage_id: Set(entry_stage.id),
                primary_status: Set(entry_stage.primary_status),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await?;

        record_transition(&txn, created.id, &entry_stage, actor, None, now).await?;
        txn.commit().await?;

        log::info!(
            "Invoice {} ({}) submitted by user {} into stage {}",
            created.id,
            created.ticket_number,
            created.user_id,
            entry_stage.slug
        );
        Ok(created)
    }
    .instrument(span)
    .await
}

pub async fn get_invoice(db: &Database, id: i32) -> Result<Option<invoice::Model>, WorkflowError> {
    Ok(invoice_repo::find_by_id(db.conn(), id).await?)
}

/// Filtered, paginated listing, newest first.
pub async fn list_invoices(
    db: &Database,
    filter: &InvoiceFilter,
) -> Result<InvoicePage, WorkflowError> {
    let (items, total) = invoice_repo::query(db.conn(), filter).await?;
    Ok(InvoicePage { items, total })
}

/// The transition ledger of an invoice, oldest first.
pub async fn history(
    db: &Database,
    invoice_id: i32,
) -> Result<Vec<stage_history::Model>, WorkflowError> {
    Ok(history_repo::for_invoice(db.conn(), invoice_id).await?)
}

pub async fn invoice_detail(
    db: &Database,
    id: i32,
) -> Result<Option<InvoiceDetail>, WorkflowError> {
    let conn = db.conn();
    let Some(invoice) = invoice_repo::find_by_id(conn, id).await? else {
        return Ok(None);
    };
    let stage = stage_repo::find_by_id(conn, invoice.stage_id).await?;
    let history = history_repo::for_invoice(conn, id).await?;
    let documents = document_repo::for_invoice(conn, id).await?;

    Ok(Some(InvoiceDetail {
        invoice,
        stage,
        history,
        documents,
    }))
}

/// Deletes an invoice together with its ledger and documents.
///
/// Returns `false` when the invoice does not exist.
pub async fn delete_invoice(db: &Database, id: i32) -> Result<bool, WorkflowError> {
    let span = info_span!("delete_invoice", invoice_id = id);
    async move {
        let txn = db.begin().await?;

        if invoice_repo::find_by_id(&txn, id).await?.is_none() {
            return Ok(false);
        }

        let documents = document_repo::delete_for_invoice(&txn, id).await?;
        let entries = history_repo::delete_for_invoice(&txn, id).await?;
        invoice_repo::delete(&txn, id).await?;
        txn.commit().await?;

        log::info!(
            "Deleted invoice {} with {} history entries and {} documents",
            id,
            entries,
            documents
        );
        Ok(true)
    }
    .instrument(span)
    .await
}

/// Attaches a supplementary file to an existing invoice.
pub async fn add_document(
    db: &Database,
    invoice_id: i32,
    uploaded_by_user_id: i32,
    filename: &str,
    path: &str,
) -> Result<client_document::Model, WorkflowError> {
    let (filename, path) = (filename.trim(), path.trim());
    if filename.is_empty() || path.is_empty() {
        return Err(WorkflowError::Validation(
            "Document filename and path must not be empty".to_string(),
        ));
    }

    let txn = db.begin().await?;
    if invoice_repo::find_by_id(&txn, invoice_id).await?.is_none() {
        return Err(WorkflowError::invoice_not_found(invoice_id));
    }

    let document =
        document_repo::insert(&txn, invoice_id, uploaded_by_user_id, filename, path, Utc::now())
            .await?;
    txn.commit().await?;

    log::debug!("Attached '{}' to invoice {}", document.filename, invoice_id);
    Ok(document)
}

pub async fn documents(
    db: &Database,
    invoice_id: i32,
) -> Result<Vec<client_document::Model>, WorkflowError> {
    Ok(document_repo::for_invoice(db.conn(), invoice_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::stage::PrimaryStatus;
    use crate::error::Missing;
    use crate::workflow::catalog::{create_stage, StageDefinition};

    async fn setup() -> (Database, stage::Model) {
        let db = Database::open_in_memory().await.unwrap();
        let stage = create_stage(
            &db,
            StageDefinition::new("Submitted", "submitted", PrimaryStatus::Submitted),
        )
        .await
        .unwrap();
        (db, stage)
    }

    #[test]
    fn test_ticket_number_format() {
        let ticket = generate_ticket_number();
        assert!(ticket.starts_with("CF-"));
        assert_eq!(ticket.len(), "CF-20240301-9F3A12BC".len());
        assert_ne!(ticket, generate_ticket_number());
    }

    #[tokio::test]
    async fn test_submit_defaults_to_first_stage() {
        let (db, stage) = setup().await;
        let mut new_invoice = NewInvoice::new(7, " /uploads/a.pdf ");
        new_invoice.amount = Some("1.234,50".to_string());
        new_invoice.company_name = Some("   ".to_string());

        let created = submit_invoice(&db, new_invoice, &Actor::user(7, "Owner"))
            .await
            .unwrap();
        assert_eq!(created.stage_id, stage.id);
        assert_eq!(created.primary_status, PrimaryStatus::Submitted);
        assert_eq!(created.file_path, "/uploads/a.pdf");
        assert_eq!(created.amount.as_deref(), Some("1.234,50"));
        assert_eq!(created.company_name, None);
        assert_eq!(created.version, 1);

        let ledger = history(&db, created.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].stage_id, stage.id);
        assert_eq!(ledger[0].changed_by_user_id, Some(7));
    }

    #[tokio::test]
    async fn test_submit_requires_catalog_and_file() {
        let db = Database::open_in_memory().await.unwrap();
        let err = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::system())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyCatalog));

        let err = submit_invoice(&db, NewInvoice::new(1, "  "), &Actor::system())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_submit_into_missing_stage() {
        let (db, _) = setup().await;
        let err = submit_invoice(&db, NewInvoice::new(1, "/a.pdf").in_stage(77), &Actor::system())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: Missing::Stage,
                id: 77
            }
        ));
    }

    #[tokio::test]
    async fn test_search_matches_wildcards_literally() {
        let (db, _) = setup().await;
        for company in ["Acme", "50% Rabatt GmbH", "north_wind"] {
            let mut new_invoice = NewInvoice::new(1, "/f.pdf");
            new_invoice.company_name = Some(company.to_string());
            submit_invoice(&db, new_invoice, &Actor::user(1, "U"))
                .await
                .unwrap();
        }

        for (term, expected) in [("%", 1), ("_", 1), ("0%", 1), ("a%e", 0), ("cm", 1)] {
            let page = list_invoices(
                &db,
                &InvoiceFilter {
                    search: Some(term.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            assert_eq!(page.total, expected, "search '{}'", term);
        }
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let (db, stage) = setup().await;
        for (user, company) in [(1, "Acme"), (1, "Globex"), (2, "Acme Two")] {
            let mut new_invoice = NewInvoice::new(user, "/f.pdf");
            new_invoice.company_name = Some(company.to_string());
            submit_invoice(&db, new_invoice, &Actor::user(user, "U"))
                .await
                .unwrap();
        }

        let own = list_invoices(
            &db,
            &InvoiceFilter {
                user_id: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(own.total, 2);
        assert!(own.items.iter().all(|i| i.user_id == 1));

        let search = list_invoices(
            &db,
            &InvoiceFilter {
                search: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(search.total, 2);

        let page = list_invoices(
            &db,
            &InvoiceFilter {
                stage_id: Some(stage.id),
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);

        let all = list_invoices(&db, &InvoiceFilter::default()).await.unwrap();
        assert!(all.items[0].id > all.items[2].id);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (db, _) = setup().await;
        let created = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();
        add_document(&db, created.id, 1, "receipt.pdf", "/docs/receipt.pdf")
            .await
            .unwrap();

        assert!(delete_invoice(&db, created.id).await.unwrap());
        assert!(get_invoice(&db, created.id).await.unwrap().is_none());
        assert!(history(&db, created.id).await.unwrap().is_empty());
        assert!(documents(&db, created.id).await.unwrap().is_empty());
        assert!(!delete_invoice(&db, created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_documents() {
        let (db, stage) = setup().await;
        let created = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();

        add_document(&db, created.id, 1, "a.pdf", "/docs/a.pdf").await.unwrap();
        add_document(&db, created.id, 9, "b.pdf", "/docs/b.pdf").await.unwrap();

        let detail = invoice_detail(&db, created.id).await.unwrap().unwrap();
        assert_eq!(detail.stage.map(|s| s.id), Some(stage.id));
        assert_eq!(detail.history.len(), 1);
        let names: Vec<&str> = detail.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);

        let err = add_document(&db, 999, 1, "x.pdf", "/x.pdf").await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
        let err = add_document(&db, created.id, 1, "", "/x.pdf").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
