//! Status and stage counts for the dashboard.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::db::entities::stage::{self, PrimaryStatus};
use crate::db::{stage_repo, stats_repo, Database};
use crate::error::WorkflowError;

/// A stage paired with the number of invoices currently in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: stage::Model,
    pub count: u64,
}

/// Invoice counts per cached status.
///
/// Non-admins only see their own invoices. Statuses without invoices are
/// absent from the map.
pub async fn summarize(
    db: &Database,
    viewer_user_id: i32,
    is_admin: bool,
) -> Result<BTreeMap<PrimaryStatus, u64>, WorkflowError> {
    let owner = (!is_admin).then_some(viewer_user_id);
    let rows = stats_repo::count_by_status(db.conn(), owner).await?;

    Ok(rows
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| (status, count as u64))
        .collect())
}

/// One row per stage in display order, counting the viewer's invoices.
/// Stages without invoices are included with a zero count.
pub async fn stage_counts(
    db: &Database,
    viewer_user_id: i32,
) -> Result<Vec<StageCount>, WorkflowError> {
    let stages = stage_repo::list_ordered(db.conn()).await?;
    let counts: HashMap<i32, i64> = stats_repo::count_by_stage(db.conn(), Some(viewer_user_id))
        .await?
        .into_iter()
        .collect();

    Ok(stages
        .into_iter()
        .map(|stage| {
            let count = counts.get(&stage.id).copied().unwrap_or(0) as u64;
            StageCount { stage, count }
        })
        .collect())
}
