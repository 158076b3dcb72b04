//! Stage catalog routes. Reads are open to every user, edits need the admin role.

use axum::extract::State;
use serde::Deserialize;

use claimflow::db::entities::stage;
use claimflow::workflow::{self, LocalizedStage, StageDefinition};
use claimflow::PrimaryStatus;

use super::{ok, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, Viewer};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StageListQuery {
    pub culture: Option<String>,
    pub status: Option<PrimaryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub offset: i32,
}

pub async fn list(
    State(state): State<AppState>,
    _viewer: Viewer,
    ApiQuery(query): ApiQuery<StageListQuery>,
) -> ApiResult<Vec<LocalizedStage>> {
    let culture = super::CultureQuery {
        culture: query.culture,
    }
    .resolve(&state);

    let stages = match query.status {
        Some(status) => workflow::stages_with_status(&state.db, status).await?,
        None => workflow::list_stages(&state.db).await?,
    };

    ok(stages
        .iter()
        .map(|stage| LocalizedStage::new(stage, culture))
        .collect())
}

pub async fn create(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiJson(definition): ApiJson<StageDefinition>,
) -> ApiResult<stage::Model> {
    viewer.require_admin()?;
    ok(workflow::create_stage(&state.db, definition).await?)
}

pub async fn update(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
    ApiJson(definition): ApiJson<StageDefinition>,
) -> ApiResult<stage::Model> {
    viewer.require_admin()?;
    ok(workflow::update_stage(&state.db, id, definition).await?)
}

pub async fn remove(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<i32> {
    viewer.require_admin()?;
    workflow::delete_stage(&state.db, id).await?;
    ok(id)
}

pub async fn move_stage(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<MoveRequest>,
) -> ApiResult<Vec<stage::Model>> {
    viewer.require_admin()?;
    if workflow::get_stage(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("stage {} not found", id)));
    }
    if !workflow::move_stage(&state.db, id, request.offset).await? {
        return Err(ApiError::Rejected(
            "Stage is already at the edge of the catalog".to_string(),
        ));
    }
    ok(workflow::list_stages(&state.db).await?)
}
