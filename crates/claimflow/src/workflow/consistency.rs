//! Re-derives each invoice's cached status from its stage.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::entities::stage::PrimaryStatus;
use crate::db::{invoice_repo, stage_repo, Database};
use crate::error::WorkflowError;

/// An invoice whose cached status disagrees with its stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDrift {
    pub invoice_id: i32,
    pub stage_id: i32,
    pub cached_status: PrimaryStatus,
    /// `None` when the referenced stage no longer exists.
    pub stage_status: Option<PrimaryStatus>,
}

/// Lists every invoice whose cached status differs from its stage's status.
pub async fn verify_status_cache(db: &Database) -> Result<Vec<StatusDrift>, WorkflowError> {
    let stage_status: HashMap<i32, PrimaryStatus> = stage_repo::list_ordered(db.conn())
        .await?
        .into_iter()
        .map(|stage| (stage.id, stage.primary_status))
        .collect();

    let drift: Vec<StatusDrift> = invoice_repo::stage_pointers(db.conn())
        .await?
        .into_iter()
        .filter_map(|(invoice_id, stage_id, cached_status)| {
            let expected = stage_status.get(&stage_id).copied();
            (expected != Some(cached_status)).then_some(StatusDrift {
                invoice_id,
                stage_id,
                cached_status,
                stage_status: expected,
            })
        })
        .collect();

    if drift.is_empty() {
        log::debug!("Status cache consistent");
    } else {
        log::warn!("{} invoice(s) carry a stale cached status", drift.len());
    }
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use sea_orm::ConnectionTrait;

    use crate::workflow::catalog::{create_stage, update_stage, StageDefinition};
    use crate::workflow::dashboard::summarize;
    use crate::workflow::invoices::{get_invoice, submit_invoice, NewInvoice};
    use crate::workflow::transition::{change_stage, Actor, StageChange};

    #[tokio::test]
    async fn test_consistent_after_transitions() {
        let db = Database::open_in_memory().await.unwrap();
        create_stage(&db, StageDefinition::new("A", "a", PrimaryStatus::Submitted))
            .await
            .unwrap();
        let b = create_stage(&db, StageDefinition::new("B", "b", PrimaryStatus::Court))
            .await
            .unwrap();
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/f.pdf"), &Actor::system())
            .await
            .unwrap();
        change_stage(&db, StageChange::new(invoice.id, b.id, Actor::system()))
            .await
            .unwrap();

        assert!(verify_status_cache(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reclassified_stage_keeps_cache_in_step() {
        let db = Database::open_in_memory().await.unwrap();
        let a = create_stage(&db, StageDefinition::new("A", "a", PrimaryStatus::Submitted))
            .await
            .unwrap();
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/f.pdf"), &Actor::system())
            .await
            .unwrap();

        update_stage(
            &db,
            a.id,
            StageDefinition::new("A", "a", PrimaryStatus::Rejected),
        )
        .await
        .unwrap();

        assert!(verify_status_cache(&db).await.unwrap().is_empty());
        let reloaded = get_invoice(&db, invoice.id).await.unwrap().unwrap();
        assert_eq!(reloaded.primary_status, PrimaryStatus::Rejected);
        assert_eq!(reloaded.version, invoice.version + 1);
        assert_eq!(
            summarize(&db, 1, false).await.unwrap(),
            BTreeMap::from([(PrimaryStatus::Rejected, 1)])
        );

        // Editing anything but the status leaves invoices alone.
        update_stage(
            &db,
            a.id,
            StageDefinition::new("A renamed", "a", PrimaryStatus::Rejected),
        )
        .await
        .unwrap();
        let reloaded = get_invoice(&db, invoice.id).await.unwrap().unwrap();
        assert_eq!(reloaded.version, invoice.version + 1);
    }

    #[tokio::test]
    async fn test_reports_out_of_band_writes() {
        let db = Database::open_in_memory().await.unwrap();
        let a = create_stage(&db, StageDefinition::new("A", "a", PrimaryStatus::Submitted))
            .await
            .unwrap();
        let invoice = submit_invoice(&db, NewInvoice::new(1, "/f.pdf"), &Actor::system())
            .await
            .unwrap();

        db.conn()
            .execute_unprepared("UPDATE invoices SET primary_status = 'court'")
            .await
            .unwrap();

        let drift = verify_status_cache(&db).await.unwrap();
        assert_eq!(
            drift,
            vec![StatusDrift {
                invoice_id: invoice.id,
                stage_id: a.id,
                cached_status: PrimaryStatus::Court,
                stage_status: Some(PrimaryStatus::Submitted),
            }]
        );

        // The next transition refreshes the cache.
        change_stage(&db, StageChange::new(invoice.id, a.id, Actor::system()))
            .await
            .unwrap();
        assert!(verify_status_cache(&db).await.unwrap().is_empty());
    }
}
