//! Stage repository: queries and writes for the `stages` table.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use super::entities::stage::{self, PrimaryStatus};

/// All stages ordered by display order, ties broken by id.
pub async fn list_ordered<C: ConnectionTrait>(conn: &C) -> Result<Vec<stage::Model>, DbErr> {
    stage::Entity::find()
        .order_by_asc(stage::Column::DisplayOrder)
        .order_by_asc(stage::Column::Id)
        .all(conn)
        .await
}

/// Stages classified under `status`, in display order.
pub async fn list_by_status<C: ConnectionTrait>(
    conn: &C,
    status: PrimaryStatus,
) -> Result<Vec<stage::Model>, DbErr> {
    stage::Entity::find()
        .filter(stage::Column::PrimaryStatus.eq(status))
        .order_by_asc(stage::Column::DisplayOrder)
        .order_by_asc(stage::Column::Id)
        .all(conn)
        .await
}

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<stage::Model>, DbErr> {
    stage::Entity::find_by_id(id).one(conn).await
}

/// Exact (case-sensitive) slug lookup.
pub async fn find_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> Result<Option<stage::Model>, DbErr> {
    stage::Entity::find()
        .filter(stage::Column::Slug.eq(slug))
        .one(conn)
        .await
}

/// Whether another stage already uses `slug`. `exclude_id` skips the stage
/// being edited.
pub async fn slug_taken<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    exclude_id: Option<i32>,
) -> Result<bool, DbErr> {
    let mut query = stage::Entity::find().filter(stage::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(stage::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

/// The first stage of the catalog, used as the default entry stage.
pub async fn first<C: ConnectionTrait>(conn: &C) -> Result<Option<stage::Model>, DbErr> {
    stage::Entity::find()
        .order_by_asc(stage::Column::DisplayOrder)
        .order_by_asc(stage::Column::Id)
        .one(conn)
        .await
}

/// Highest display order in use, `None` for an empty catalog.
pub async fn max_display_order<C: ConnectionTrait>(conn: &C) -> Result<Option<i32>, DbErr> {
    stage::Entity::find()
        .select_only()
        .column_as(stage::Column::DisplayOrder.max(), "max_order")
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await
        .map(Option::flatten)
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    stage::Entity::find().count(conn).await
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    model: stage::ActiveModel,
) -> Result<stage::Model, DbErr> {
    model.insert(conn).await
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    model: stage::ActiveModel,
) -> Result<stage::Model, DbErr> {
    model.update(conn).await
}

/// Rewrites only the display order of one stage.
pub async fn set_display_order<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    display_order: i32,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr> {
    stage::Entity::update_many()
        .col_expr(stage::Column::DisplayOrder, Expr::value(display_order))
        .col_expr(stage::Column::UpdatedAt, Expr::value(updated_at))
        .filter(stage::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Deletes a stage row, returning the number of rows removed.
pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64, DbErr> {
    let result = stage::Entity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected)
}
