//! Aggregate invoice counts for dashboards.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, QueryTrait,
};

use super::entities::invoice;
use super::entities::stage::PrimaryStatus;

/// Invoice counts grouped by the cached primary status.
///
/// Only statuses with at least one invoice appear. `user_id` restricts the
/// count to one owner.
pub async fn count_by_status<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
) -> Result<Vec<(PrimaryStatus, i64)>, DbErr> {
    invoice::Entity::find()
        .select_only()
        .column(invoice::Column::PrimaryStatus)
        .column_as(invoice::Column::Id.count(), "invoice_count")
        .apply_if(user_id, |q, user_id| {
            q.filter(invoice::Column::UserId.eq(user_id))
        })
        .group_by(invoice::Column::PrimaryStatus)
        .into_tuple()
        .all(conn)
        .await
}

/// Invoice counts grouped by current stage id.
pub async fn count_by_stage<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
) -> Result<Vec<(i32, i64)>, DbErr> {
    invoice::Entity::find()
        .select_only()
        .column(invoice::Column::StageId)
        .column_as(invoice::Column::Id.count(), "invoice_count")
        .apply_if(user_id, |q, user_id| {
            q.filter(invoice::Column::UserId.eq(user_id))
        })
        .group_by(invoice::Column::StageId)
        .into_tuple()
        .all(conn)
        .await
}
