//! Invoice routes.
//!
//! Users see and submit their own invoices. Administrators see every invoice
//! and are the only ones allowed to move invoices between stages or delete
//! them. Foreign invoices are reported as missing rather than forbidden so
//! ids cannot be discovered by guessing.

use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use claimflow::db::entities::{client_document, invoice, stage_history};
use claimflow::db::invoice_repo::InvoiceFilter;
use claimflow::workflow::{self, InvoicePage, LocalizedStage, NewInvoice, StageChange};
use claimflow::PrimaryStatus;

use super::{
    ok, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, CultureQuery, Viewer,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListQuery {
    pub user_id: Option<i32>,
    pub stage_id: Option<i32>,
    pub status: Option<PrimaryStatus>,
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
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
    #[serde(default)]
    pub stage_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStageRequest {
    pub stage_id: i32,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub invoice: invoice::Model,
    pub stage: Option<LocalizedStage>,
    pub history: Vec<stage_history::Model>,
    pub documents: Vec<client_document::Model>,
}

/// Loads an invoice the viewer may see, or reports it as missing.
pub(super) async fn visible_invoice(
    state: &AppState,
    viewer: &Viewer,
    id: i32,
) -> Result<invoice::Model, ApiError> {
    match workflow::get_invoice(&state.db, id).await? {
        Some(invoice) if viewer.is_admin || invoice.user_id == viewer.user_id => Ok(invoice),
        _ => Err(ApiError::NotFound(format!("invoice {} not found", id))),
    }
}

pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiQuery(query): ApiQuery<InvoiceListQuery>,
) -> ApiResult<InvoicePage> {
    let user_id = if viewer.is_admin {
        query.user_id
    } else {
        Some(viewer.user_id)
    };

    let filter = InvoiceFilter {
        user_id,
        stage_id: query.stage_id,
        primary_status: query.status,
        search: query.search,
        limit: query.limit,
        offset: query.offset,
    };
    ok(workflow::list_invoices(&state.db, &filter).await?)
}

pub async fn submit(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiJson(request): ApiJson<SubmitRequest>,
) -> ApiResult<invoice::Model> {
    let stage_id = match request.stage_id {
        Some(_) if !viewer.is_admin => {
            log::debug!(
                "Ignoring entry stage requested by non-admin user {}",
                viewer.user_id
            );
            None
        }
        other => other,
    };

    let new_invoice = NewInvoice {
        user_id: viewer.user_id,
        file_path: request.file_path,
        power_of_attorney_path: request.power_of_attorney_path,
        company_name: request.company_name,
        amount: request.amount,
        currency: request.currency,
        invoice_date: request.invoice_date,
        description: request.description,
        stage_id,
    };

    let invoice = workflow::submit_invoice(&state.db, new_invoice, &viewer.actor()).await?;
    state.request_extraction(invoice.id);
    ok(invoice)
}

pub async fn detail(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(culture): ApiQuery<CultureQuery>,
) -> ApiResult<InvoiceView> {
    visible_invoice(&state, &viewer, id).await?;
    let culture = culture.resolve(&state);

    let detail = workflow::invoice_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invoice {} not found", id)))?;

    ok(InvoiceView {
        stage: detail
            .stage
            .as_ref()
            .map(|stage| LocalizedStage::new(stage, culture)),
        invoice: detail.invoice,
        history: detail.history,
        documents: detail.documents,
    })
}

pub async fn history(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Vec<stage_history::Model>> {
    visible_invoice(&state, &viewer, id).await?;
    ok(workflow::history(&state.db, id).await?)
}

pub async fn remove(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<i32> {
    viewer.require_admin()?;
    if !workflow::delete_invoice(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("invoice {} not found", id)));
    }
    ok(id)
}

pub async fn change_stage(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<ChangeStageRequest>,
) -> ApiResult<invoice::Model> {
    viewer.require_admin()?;

    let mut change = StageChange::new(id, request.stage_id, viewer.actor());
    if let Some(note) = request.note.filter(|n| !n.trim().is_empty()) {
        change = change.with_note(note);
    }
    if let Some(version) = request.expected_version {
        change = change.expecting_version(version);
    }

    if !workflow::change_stage(&state.db, change).await? {
        return Err(ApiError::NotFound(format!(
            "invoice {} or stage {} not found",
            id, request.stage_id
        )));
    }

    let invoice = workflow::get_invoice(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invoice {} not found", id)))?;
    ok(invoice)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use super::super::test_support::*;

    async fn with_catalog(app: &axum::Router) -> Vec<i64> {
        let mut ids = Vec::new();
        for (name, slug, status) in [
            ("Submitted", "submitted", "submitted"),
            ("In review", "in-review", "in_review"),
            ("Accepted", "accepted", "accepted"),
        ] {
            let (_, body) = call(
                app,
                Method::POST,
                "/api/stages",
                Some(ADMIN),
                Some(json!({ "name": name, "slug": slug, "primary_status": status })),
            )
            .await;
            ids.push(body["data"]["id"].as_i64().unwrap());
        }
        ids
    }

    async fn submit(app: &axum::Router, who: (i32, bool)) -> Value {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/invoices",
            Some(who),
            Some(json!({ "file_path": "uploads/invoice.pdf", "amount": "120,00" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_submit_enters_first_stage_and_enqueues_extraction() {
        let (app, state) = app().await;
        let stages = with_catalog(&app).await;

        let invoice = submit(&app, ALICE).await;
        assert_eq!(invoice["user_id"], ALICE.0);
        assert_eq!(invoice["stage_id"], stages[0]);
        assert_eq!(invoice["primary_status"], "submitted");
        assert!(invoice["ticket_number"].as_str().unwrap().starts_with("CF-"));
        assert_eq!(state.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_catalog_reports_failure() {
        let (app, state) = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/invoices",
            Some(ALICE),
            Some(json!({ "file_path": "uploads/invoice.pdf" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(state.queue.is_empty());
    }

    #[tokio::test]
    async fn test_other_users_invoice_is_not_found() {
        let (app, _) = app().await;
        with_catalog(&app).await;
        let invoice = submit(&app, ALICE).await;
        let uri = format!("/api/invoices/{}", invoice["id"]);

        let (status, _) = call(&app, Method::GET, &uri, Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::GET, &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, Method::GET, "/api/invoices", Some(BOB), None).await;
        assert_eq!(body["data"]["total"], 0);
        let (_, body) = call(&app, Method::GET, "/api/invoices", Some(ADMIN), None).await;
        assert_eq!(body["data"]["total"], 1);
    }

    #[tokio::test]
    async fn test_change_stage_with_note_and_localized_detail() {
        let (app, _) = app().await;
        let stages = with_catalog(&app).await;
        let invoice = submit(&app, ALICE).await;

        let uri = format!("/api/invoices/{}/stage", invoice["id"]);
        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some(ADMIN),
            Some(json!({
                "stage_id": stages[1],
                "note": "missing doc",
                "expected_version": invoice["version"],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["primary_status"], "in_review");

        let uri = format!("/api/invoices/{}?culture=de", invoice["id"]);
        let (_, body) = call(&app, Method::GET, &uri, Some(ALICE), None).await;
        assert_eq!(body["data"]["stage"]["status_label"], "In Prüfung");
        let history = body["data"]["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1]["note"], "missing doc");
    }

    #[tokio::test]
    async fn test_stale_version_is_conflict() {
        let (app, _) = app().await;
        let stages = with_catalog(&app).await;
        let invoice = submit(&app, ALICE).await;
        let uri = format!("/api/invoices/{}/stage", invoice["id"]);

        let first = json!({ "stage_id": stages[1], "expected_version": invoice["version"] });
        let (status, _) = call(&app, Method::POST, &uri, Some(ADMIN), Some(first)).await;
        assert_eq!(status, StatusCode::OK);

        let second = json!({ "stage_id": stages[2], "expected_version": invoice["version"] });
        let (status, body) = call(&app, Method::POST, &uri, Some(ADMIN), Some(second)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_change_stage_requires_admin_and_existing_invoice() {
        let (app, _) = app().await;
        let stages = with_catalog(&app).await;
        let invoice = submit(&app, ALICE).await;

        let uri = format!("/api/invoices/{}/stage", invoice["id"]);
        let change = Some(json!({ "stage_id": stages[2] }));
        let (status, _) = call(&app, Method::POST, &uri, Some(ALICE), change).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/invoices/4242/stage",
            Some(ADMIN),
            Some(json!({ "stage_id": stages[2] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_deletes_invoice() {
        let (app, _) = app().await;
        with_catalog(&app).await;
        let invoice = submit(&app, ALICE).await;
        let uri = format!("/api/invoices/{}", invoice["id"]);

        let (status, body) = call(&app, Method::DELETE, &uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = call(&app, Method::DELETE, &uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
