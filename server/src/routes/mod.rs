//! HTTP routes.
//!
//! Routes are organized by domain:
//! - `stages`: stage catalog management
//! - `invoices`: submission, listing, detail and stage changes
//! - `documents`: supplementary files of an invoice
//! - `dashboard`: status and stage counts
//! - `admin`: diagnostics
//!
//! Identity comes from headers set by the upstream gateway. Every response
//! body uses the [`ApiResponse`] envelope.

mod admin;
mod dashboard;
mod documents;
mod extract;
mod invoices;
mod stages;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use claimflow::workflow::Actor;
use claimflow::{Culture, WorkflowError};

use crate::state::AppState;

pub use extract::{ApiJson, ApiPath, ApiQuery};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Response wrapper for API calls.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed path, query or body, with the status axum assigned to it.
    Invalid {
        status: StatusCode,
        message: String,
    },
    Unauthorized(String),
    Forbidden,
    NotFound(String),
    /// Expected business outcome reported with `success: false`.
    Rejected(String),
    Workflow(WorkflowError),
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid { status, message } => (status, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Administrator role required".to_string(),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Rejected(message) => (StatusCode::OK, message),
            ApiError::Workflow(err) => match err {
                WorkflowError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                WorkflowError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
                ref e if e.is_business_rule() => (StatusCode::OK, e.to_string()),
                other => {
                    log::error!("Request failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(ApiResponse::<()>::err(message))).into_response()
    }
}

/// The calling user, as asserted by the gateway headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: i32,
    pub name: String,
    pub is_admin: bool,
}

impl Viewer {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id = header(USER_ID_HEADER)
            .and_then(|v| v.parse::<i32>().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing or invalid X-User-Id header".to_string())
            })?;
        let name = header(USER_NAME_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| format!("user-{}", user_id));
        let is_admin = header(USER_ROLE_HEADER)
            .map(|roles| roles.split(',').any(|r| r.trim().eq_ignore_ascii_case("admin")))
            .unwrap_or(false);

        Ok(Self {
            user_id,
            name,
            is_admin,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor::user(self.user_id, self.name.clone())
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Viewer::from_headers(&parts.headers)
    }
}

/// `?culture=de-DE`; unknown or absent tags use the configured default.
#[derive(Debug, Default, Deserialize)]
pub struct CultureQuery {
    pub culture: Option<String>,
}

impl CultureQuery {
    pub fn resolve(&self, state: &AppState) -> Culture {
        self.culture
            .as_deref()
            .and_then(Culture::parse)
            .unwrap_or_else(|| state.default_culture())
    }
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> (StatusCode, Json<ApiResponse<&'static str>>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok("ok"))),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::err("database unavailable")),
            )
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stages", get(stages::list).post(stages::create))
        .route("/api/stages/:id", put(stages::update).delete(stages::remove))
        .route("/api/stages/:id/move", post(stages::move_stage))
        .route("/api/invoices", get(invoices::list).post(invoices::submit))
        .route("/api/invoices/:id", get(invoices::detail).delete(invoices::remove))
        .route("/api/invoices/:id/stage", post(invoices::change_stage))
        .route("/api/invoices/:id/history", get(invoices::history))
        .route(
            "/api/invoices/:id/documents",
            get(documents::list).post(documents::attach),
        )
        .route("/api/dashboard/summary", get(dashboard::summary))
        .route("/api/dashboard/stages", get(dashboard::stages))
        .route("/api/admin/consistency", get(admin::consistency))
        .with_state(state)
}
