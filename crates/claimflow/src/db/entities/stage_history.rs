//! Stage history entity: the append-only transition ledger.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One recorded transition. Rows are inserted, never updated or deleted
/// (apart from the cascade when their invoice is removed).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "stage_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub invoice_id: i32,
    /// The stage transitioned into.
    pub stage_id: i32,
    /// `None` for system-initiated transitions.
    pub changed_by_user_id: Option<i32>,
    /// Name of the actor at the time of the change.
    pub changed_by_name: String,
    pub changed_at: DateTimeUtc,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
    #[sea_orm(
        belongs_to = "super::stage::Entity",
        from = "Column::StageId",
        to = "super::stage::Column::Id",
        on_delete = "Restrict"
    )]
    Stage,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
