//! The workflow transition: move an invoice to a stage and record it.
//!
//! Any stage may follow any other. The invoice row and the ledger are written
//! in one transaction; the cached `primary_status` is copied from the target
//! stage here and nowhere else.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use crate::db::entities::{stage, stage_history};
use crate::db::history_repo::{self, NewHistoryEntry};
use crate::db::{invoice_repo, stage_repo, Database};
use crate::error::WorkflowError;

/// Name recorded for transitions that no user initiated.
pub const SYSTEM_ACTOR_NAME: &str = "System";

/// Who performed a transition. The name is snapshotted into the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<i32>,
    pub name: String,
}

impl Actor {
    pub fn user(user_id: i32, name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            name: name.into(),
        }
    }

    pub fn system() -> Self {
        Self {
            user_id: None,
            name: SYSTEM_ACTOR_NAME.to_string(),
        }
    }
}

/// A requested stage change.
#[derive(Debug, Clone)]
pub struct StageChange {
    pub invoice_id: i32,
    pub stage_id: i32,
    pub actor: Actor,
    pub note: Option<String>,
    /// Version the caller last saw. `None` skips the check.
    pub expected_version: Option<i32>,
}

impl StageChange {
    pub fn new(invoice_id: i32, stage_id: i32, actor: Actor) -> Self {
        Self {
            invoice_id,
            stage_id,
            actor,
            note: None,
            expected_version: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn expecting_version(mut self, version: i32) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Moves an invoice to a stage.
///
/// Returns `Ok(false)` without writing anything when the invoice or the stage
/// does not exist. Moving an invoice to its current stage is recorded like
/// any other transition. Fails with [`WorkflowError::Conflict`] when the
/// invoice's version differs from the expected one or changes before the
/// update lands.
pub async fn change_stage(db: &Database, change: StageChange) -> Result<bool, WorkflowError> {
    let span = info_span!(
        "change_stage",
        invoice_id = change.invoice_id,
        stage_id = change.stage_id
    );
    async move {
        let txn = db.begin().await?;

        let Some(invoice) = invoice_repo::find_by_id(&txn, change.invoice_id).await? else {
            log::info!("Stage change skipped: invoice {} not found", change.invoice_id);
            return Ok(false);
        };
        let Some(target) = stage_repo::find_by_id(&txn, change.stage_id).await? else {
            log::info!("Stage change skipped: stage {} not found", change.stage_id);
            return Ok(false);
        };

        if let Some(expected) = change.expected_version {
            if expected != invoice.version {
                return Err(WorkflowError::Conflict {
                    invoice_id: invoice.id,
                    expected,
                });
            }
        }

        let changed_at = next_ledger_timestamp(&txn, invoice.id).await?;

        let updated = invoice_repo::update_stage(
            &txn,
            invoice.id,
            invoice.version,
            target.id,
            target.primary_status,
            changed_at,
        )
        .await?;
        if !updated {
            return Err(WorkflowError::Conflict {
                invoice_id: invoice.id,
                expected: invoice.version,
            });
        }

        record_transition(
            &txn,
            invoice.id,
            &target,
            &change.actor,
            change.note,
            changed_at,
        )
        .await?;

        txn.commit().await?;

        log::info!(
            "Invoice {} moved from stage {} to {} ({}) by {}",
            invoice.id,
            invoice.stage_id,
            target.id,
            target.primary_status,
            change.actor.name
        );
        Ok(true)
    }
    .instrument(span)
    .await
}

/// Timestamp for the next ledger row of an invoice: now, or the newest
/// existing row's timestamp if the clock went backwards.
pub(crate) async fn next_ledger_timestamp<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<DateTime<Utc>, DbErr> {
    let now = Utc::now();
    Ok(match history_repo::latest(conn, invoice_id).await? {
        Some(last) if last.changed_at > now => last.changed_at,
        _ => now,
    })
}

/// Copies a reclassified stage's status onto the invoices sitting in it, so
/// the cache matches the stage again before the catalog edit commits.
pub(crate) async fn restamp_stage_members<C: ConnectionTrait>(
    conn: &C,
    stage: &stage::Model,
    now: DateTime<Utc>,
) -> Result<u64, DbErr> {
    invoice_repo::restamp_status(conn, stage.id, stage.primary_status, now).await
}

/// Appends the ledger row for an invoice entering `target`.
pub(crate) async fn record_transition<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
    target: &stage::Model,
    actor: &Actor,
    note: Option<String>,
    changed_at: DateTime<Utc>,
) -> Result<stage_history::Model, DbErr> {
    history_repo::append(
        conn,
        NewHistoryEntry {
            invoice_id,
            stage_id: target.id,
            changed_by_user_id: actor.user_id,
            changed_by_name: actor.name.clone(),
            changed_at,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::stage::PrimaryStatus;
    use crate::workflow::catalog::{create_stage, StageDefinition};
    use crate::workflow::invoices::{get_invoice, history, submit_invoice, NewInvoice};

    async fn setup() -> (Database, stage::Model, stage::Model) {
        let db = Database::open_in_memory().await.unwrap();
        let submitted = create_stage(
            &db,
            StageDefinition::new("Submitted", "submitted", PrimaryStatus::Submitted),
        )
        .await
        .unwrap();
        let review = create_stage(
            &db,
            StageDefinition::new("In review", "in-review", PrimaryStatus::InReview),
        )
        .await
        .unwrap();
        (db, submitted, review)
    }

    #[tokio::test]
    async fn test_change_updates_invoice_and_ledger() {
        let (db, _, review) = setup().await;
        let owner = Actor::user(7, "Owner");
        let invoice = submit_invoice(&db, NewInvoice::new(7, "/uploads/a.pdf"), &owner)
            .await
            .unwrap();

        let change = StageChange::new(invoice.id, review.id, Actor::user(3, "Alice"))
            .with_note("missing doc");
        let changed = change_stage(&db, change).await.unwrap();
        assert!(changed);

        let reloaded = get_invoice(&db, invoice.id).await.unwrap().unwrap();
        assert_eq!(reloaded.stage_id, review.id);
        assert_eq!(reloaded.primary_status, PrimaryStatus::InReview);
        assert_eq!(reloaded.version, invoice.version + 1);
        assert!(reloaded.updated_at >= invoice.updated_at);

        let ledger = history(&db, invoice.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        let last = ledger.last().unwrap();
        assert_eq!(last.stage_id, review.id);
        assert_eq!(last.changed_by_user_id, Some(3));
        assert_eq!(last.changed_by_name, "Alice");
        assert_eq!(last.note.as_deref(), Some("missing doc"));
        assert!(last.changed_at >= ledger[0].changed_at);
    }

    #[tokio::test]
    async fn test_missing_invoice_or_stage_returns_false() {
        let (db, submitted, _) = setup().await;
        assert!(!change_stage(&db, StageChange::new(999, submitted.id, Actor::system()))
            .await
            .unwrap());

        let invoice = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();
        assert!(!change_stage(&db, StageChange::new(invoice.id, 999, Actor::system()))
            .await
            .unwrap());

        let reloaded = get_invoice(&db, invoice.id).await.unwrap().unwrap();
        assert_eq!(reloaded.version, invoice.version);
        assert_eq!(history(&db, invoice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_stage_is_recorded() {
        let (db, submitted, _) = setup().await;
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();

        assert!(change_stage(&db, StageChange::new(invoice.id, submitted.id, Actor::system()))
            .await
            .unwrap());
        let ledger = history(&db, invoice.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].changed_by_user_id, None);
        assert_eq!(ledger[1].changed_by_name, SYSTEM_ACTOR_NAME);
    }

    #[tokio::test]
    async fn test_ledger_is_append_only() {
        let (db, submitted, review) = setup().await;
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();
        let before = history(&db, invoice.id).await.unwrap();

        for stage_id in [review.id, submitted.id, review.id] {
            assert!(change_stage(&db, StageChange::new(invoice.id, stage_id, Actor::system()))
                .await
                .unwrap());
        }

        let after = history(&db, invoice.id).await.unwrap();
        assert_eq!(after.len(), before.len() + 3);
        assert_eq!(&after[..before.len()], &before[..]);
        for pair in after.windows(2) {
            assert!(pair[1].changed_at >= pair[0].changed_at);
        }
        let current = get_invoice(&db, invoice.id).await.unwrap().unwrap();
        assert_eq!(after.last().unwrap().stage_id, current.stage_id);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts_and_writes_nothing() {
        let (db, _, review) = setup().await;
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();

        let err = change_stage(
            &db,
            StageChange::new(invoice.id, review.id, Actor::system())
                .expecting_version(invoice.version + 5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict { .. }));

        let reloaded = get_invoice(&db, invoice.id).await.unwrap().unwrap();
        assert_eq!(reloaded.stage_id, invoice.stage_id);
        assert_eq!(reloaded.version, invoice.version);
        assert_eq!(history(&db, invoice.id).await.unwrap().len(), 1);

        assert!(change_stage(
            &db,
            StageChange::new(invoice.id, review.id, Actor::system())
                .expecting_version(invoice.version),
        )
        .await
        .unwrap());
    }

    #[tokio::test]
    async fn test_ledger_timestamp_never_goes_backwards() {
        let (db, _, review) = setup().await;
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/a.pdf"), &Actor::user(1, "U"))
            .await
            .unwrap();

        // A row stamped in the future, as if written by a host with a fast clock.
        let future = Utc::now() + chrono::Duration::hours(1);
        record_transition(db.conn(), invoice.id, &review, &Actor::system(), None, future)
            .await
            .unwrap();

        assert!(change_stage(&db, StageChange::new(invoice.id, review.id, Actor::system()))
            .await
            .unwrap());
        let ledger = history(&db, invoice.id).await.unwrap();
        assert_eq!(ledger.last().unwrap().changed_at, future);
    }
}
