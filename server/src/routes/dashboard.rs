//! Dashboard counts, scoped to the caller's own invoices unless they are an admin.

use std::collections::BTreeMap;

use axum::extract::State;
use serde::Serialize;

use claimflow::workflow::{self, LocalizedStage};
use claimflow::PrimaryStatus;

use super::{ok, ApiQuery, ApiResult, CultureQuery, Viewer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryView {
    /// Only statuses with at least one invoice appear.
    pub counts: BTreeMap<PrimaryStatus, u64>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct StageCountView {
    pub stage: LocalizedStage,
    pub count: u64,
}

pub async fn summary(State(state): State<AppState>, viewer: Viewer) -> ApiResult<SummaryView> {
    let counts = workflow::summarize(&state.db, viewer.user_id, viewer.is_admin).await?;
    let total = counts.values().sum();
    ok(SummaryView { counts, total })
}

/// Per-stage counts of the viewer's own invoices.
pub async fn stages(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiQuery(culture): ApiQuery<CultureQuery>,
) -> ApiResult<Vec<StageCountView>> {
    let culture = culture.resolve(&state);
    let rows = workflow::stage_counts(&state.db, viewer.user_id).await?;
    ok(rows
        .into_iter()
        .map(|row| StageCountView {
            stage: LocalizedStage::new(&row.stage, culture),
            count: row.count,
        })
        .collect())
}
