//! Invoice entity: a submitted claim bound to exactly one current stage.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::stage::PrimaryStatus;

/// Invoice entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning user.
    #[sea_orm(indexed)]
    pub user_id: i32,
    /// Stored invoice file.
    pub file_path: String,
    /// Optional power-of-attorney document.
    pub power_of_attorney_path: Option<String>,
    pub company_name: Option<String>,
    /// Kept as text to preserve the original formatting.
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub invoice_date: Option<Date>,
    pub description: Option<String>,
    #[sea_orm(unique)]
    pub ticket_number: String,
    pub stage_id: i32,
    /// Mirror of the current stage's status. Written only by the workflow.
    pub primary_status: PrimaryStatus,
    /// Optimistic concurrency token, bumped on every stage change.
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stage::Entity",
        from = "Column::StageId",
        to = "super::stage::Column::Id",
        on_delete = "Restrict"
    )]
    Stage,
    #[sea_orm(has_many = "super::stage_history::Entity")]
    StageHistory,
    #[sea_orm(has_many = "super::client_document::Entity")]
    ClientDocument,
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl Related<super::stage_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageHistory.def()
    }
}

impl Related<super::client_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientDocument.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Fields the extraction consumer is allowed to fill.
    pub fn missing_extracted_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.company_name) {
            missing.push("company_name");
        }
        if is_blank(&self.amount) {
            missing.push("amount");
        }
        if self.invoice_date.is_none() {
            missing.push("invoice_date");
        }
        if is_blank(&self.currency) {
            missing.push("currency");
        }
        if is_blank(&self.description) {
            missing.push("description");
        }
        missing
    }
}

/// `None` and whitespace-only values count as empty.
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}
