//! Stage entity: one step of the claim-processing workflow.

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Coarse-grained claim status shared by one or more stages.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PrimaryStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "in_review")]
    InReview,
    #[sea_orm(string_value = "inquiry")]
    Inquiry,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "court")]
    Court,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "court_prep")]
    CourtPrep,
    #[sea_orm(string_value = "waiting_court")]
    WaitingCourt,
    #[sea_orm(string_value = "deadline_running")]
    DeadlineRunning,
    #[sea_orm(string_value = "court_response")]
    CourtResponse,
    #[sea_orm(string_value = "enforcement_ready")]
    EnforcementReady,
    #[sea_orm(string_value = "enforcement_in_progress")]
    EnforcementInProgress,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl PrimaryStatus {
    /// Stable identifier, identical to the stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryStatus::Draft => "draft",
            PrimaryStatus::Submitted => "submitted",
            PrimaryStatus::InReview => "in_review",
            PrimaryStatus::Inquiry => "inquiry",
            PrimaryStatus::Accepted => "accepted",
            PrimaryStatus::Court => "court",
            PrimaryStatus::Completed => "completed",
            PrimaryStatus::CourtPrep => "court_prep",
            PrimaryStatus::WaitingCourt => "waiting_court",
            PrimaryStatus::DeadlineRunning => "deadline_running",
            PrimaryStatus::CourtResponse => "court_response",
            PrimaryStatus::EnforcementReady => "enforcement_ready",
            PrimaryStatus::EnforcementInProgress => "enforcement_in_progress",
            PrimaryStatus::Cancelled => "cancelled",
            PrimaryStatus::Rejected => "rejected",
        }
    }

    /// Parses the stored identifier.
    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|status| status.as_str() == value)
    }
}

impl std::fmt::Display for PrimaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "stages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub name_de: Option<String>,
    /// URL-safe identifier, unique across the catalog (case sensitive).
    #[sea_orm(unique)]
    pub slug: String,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
    /// Guidance shown to the claim owner about what happens next.
    pub next_steps: Option<String>,
    pub next_steps_de: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub display_order: i32,
    pub primary_status: PrimaryStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoice,
    #[sea_orm(has_many = "super::stage_history::Entity")]
    StageHistory,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::stage_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
