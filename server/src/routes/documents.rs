//! Supplementary documents attached to an invoice, visible to its owner and admins.

use axum::extract::State;
use serde::Deserialize;

use claimflow::db::entities::client_document;
use claimflow::workflow;

use super::invoices::visible_invoice;
use super::{ok, ApiJson, ApiPath, ApiResult, Viewer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    pub filename: String,
    pub path: String,
}

pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Vec<client_document::Model>> {
    visible_invoice(&state, &viewer, id).await?;
    ok(workflow::documents(&state.db, id).await?)
}

pub async fn attach(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<AttachRequest>,
) -> ApiResult<client_document::Model> {
    visible_invoice(&state, &viewer, id).await?;
    let document =
        workflow::add_document(&state.db, id, viewer.user_id, &request.filename, &request.path)
            .await?;
    ok(document)
}
