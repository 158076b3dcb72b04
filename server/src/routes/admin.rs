//! Operator diagnostics.

use axum::extract::State;
use serde::Serialize;

use claimflow::ingestion::QueueStats;
use claimflow::workflow::{self, StatusDrift};

use super::{ok, ApiResult, Viewer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConsistencyReport {
    pub drift: Vec<StatusDrift>,
    pub queue: QueueStats,
}

pub async fn consistency(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<ConsistencyReport> {
    viewer.require_admin()?;
    let drift = workflow::verify_status_cache(&state.db).await?;
    if !drift.is_empty() {
        log::warn!("{} invoice(s) have a stale cached status", drift.len());
    }
    ok(ConsistencyReport {
        drift,
        queue: state.queue.stats(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::super::test_support::*;

    #[tokio::test]
    async fn test_consistency_report() {
        let (app, _) = app().await;
        let uri = "/api/admin/consistency";
        let (status, _) = call(&app, Method::GET, uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, Method::GET, uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["drift"].as_array().unwrap().is_empty());
        assert_eq!(body["data"]["queue"]["capacity"], 10);
    }
}
