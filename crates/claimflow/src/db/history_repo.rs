//! Stage history repository: append and read the transition ledger.
//!
//! Rows are append-only; the only delete is the cascade of a removed invoice.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::stage_history;

/// A ledger row about to be appended.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub invoice_id: i32,
    pub stage_id: i32,
    pub changed_by_user_id: Option<i32>,
    pub changed_by_name: String,
    pub changed_at: chrono::DateTime<chrono::Utc>,
    pub note: Option<String>,
}

/// Appends one row to the ledger.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: NewHistoryEntry,
) -> Result<stage_history::Model, DbErr> {
    stage_history::ActiveModel {
        invoice_id: Set(entry.invoice_id),
        stage_id: Set(entry.stage_id),
        changed_by_user_id: Set(entry.changed_by_user_id),
        changed_by_name: Set(entry.changed_by_name),
        changed_at: Set(entry.changed_at),
        note: Set(entry.note),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// The ledger of one invoice in chronological order.
pub async fn for_invoice<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<Vec<stage_history::Model>, DbErr> {
    stage_history::Entity::find()
        .filter(stage_history::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(stage_history::Column::ChangedAt)
        .order_by_asc(stage_history::Column::Id)
        .all(conn)
        .await
}

/// The most recent ledger row of one invoice.
pub async fn latest<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<Option<stage_history::Model>, DbErr> {
    stage_history::Entity::find()
        .filter(stage_history::Column::InvoiceId.eq(invoice_id))
        .order_by_desc(stage_history::Column::ChangedAt)
        .order_by_desc(stage_history::Column::Id)
        .one(conn)
        .await
}

/// Number of ledger rows pointing at `stage_id`.
pub async fn count_for_stage<C: ConnectionTrait>(conn: &C, stage_id: i32) -> Result<u64, DbErr> {
    stage_history::Entity::find()
        .filter(stage_history::Column::StageId.eq(stage_id))
        .count(conn)
        .await
}

/// Removes the ledger of a deleted invoice.
pub(crate) async fn delete_for_invoice<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<u64, DbErr> {
    let result = stage_history::Entity::delete_many()
        .filter(stage_history::Column::InvoiceId.eq(invoice_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
