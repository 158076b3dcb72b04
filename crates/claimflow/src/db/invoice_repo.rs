//! Invoice repository: queries and writes for the `invoices` table.
//!
//! Stage columns (`stage_id`, `primary_status`, `version`) are only written
//! through [`update_stage`] and [`restamp_status`]; everything else leaves
//! them untouched.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select,
};

use super::entities::invoice;
use super::entities::stage::PrimaryStatus;

/// Query filter parameters for invoice listing.
#[derive(Debug, Default, Clone)]
pub struct InvoiceFilter {
    /// Restrict to one owner. `None` lists every user's invoices.
    pub user_id: Option<i32>,
    pub stage_id: Option<i32>,
    pub primary_status: Option<PrimaryStatus>,
    /// Substring match over company, ticket number and description.
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Default page size when the filter does not set one.
pub const DEFAULT_LIMIT: u64 = 100;

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    model: invoice::ActiveModel,
) -> Result<invoice::Model, DbErr> {
    model.insert(conn).await
}

/// Finds an invoice by its ID.
pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<invoice::Model>, DbErr> {
    invoice::Entity::find_by_id(id).one(conn).await
}

/// `%term%`, with LIKE wildcards inside `term` matched literally.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

fn filtered(filter: &InvoiceFilter) -> Select<invoice::Entity> {
    invoice::Entity::find()
        .apply_if(filter.user_id, |q, user_id| {
            q.filter(invoice::Column::UserId.eq(user_id))
        })
        .apply_if(filter.stage_id, |q, stage_id| {
            q.filter(invoice::Column::StageId.eq(stage_id))
        })
        .apply_if(filter.primary_status, |q, status| {
            q.filter(invoice::Column::PrimaryStatus.eq(status))
        })
        .apply_if(
            filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            |q, term| {
                q.filter(
                    Condition::any()
                        .add(invoice::Column::CompanyName.like(contains_pattern(term)))
                        .add(invoice::Column::TicketNumber.like(contains_pattern(term)))
                        .add(invoice::Column::Description.like(contains_pattern(term))),
                )
            },
        )
}

/// Queries invoices with filters, returning (rows, total_count).
pub async fn query<C: ConnectionTrait>(
    conn: &C,
    filter: &InvoiceFilter,
) -> Result<(Vec<invoice::Model>, u64), DbErr> {
    let select = filtered(filter);
    let total = select.clone().count(conn).await?;

    let rows = select
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .limit(filter.limit.unwrap_or(DEFAULT_LIMIT))
        .offset(filter.offset.unwrap_or(0))
        .all(conn)
        .await?;

    Ok((rows, total))
}

/// Number of invoices whose current stage is `stage_id`.
pub async fn count_in_stage<C: ConnectionTrait>(conn: &C, stage_id: i32) -> Result<u64, DbErr> {
    invoice::Entity::find()
        .filter(invoice::Column::StageId.eq(stage_id))
        .count(conn)
        .await
}

/// Moves an invoice to a stage, guarded by its version token.
///
/// Returns `false` when no row matched `(id, expected_version)`.
pub async fn update_stage<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    expected_version: i32,
    stage_id: i32,
    status: PrimaryStatus,
    updated_at: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let result = invoice::Entity::update_many()
        .col_expr(invoice::Column::StageId, Expr::value(stage_id))
        .col_expr(invoice::Column::PrimaryStatus, Expr::value(status))
        .col_expr(invoice::Column::UpdatedAt, Expr::value(updated_at))
        .col_expr(
            invoice::Column::Version,
            Expr::col(invoice::Column::Version).add(1),
        )
        .filter(invoice::Column::Id.eq(id))
        .filter(invoice::Column::Version.eq(expected_version))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Sets the cached status of every invoice in `stage_id`, bumping each
/// version. Returns the number of invoices touched.
pub async fn restamp_status<C: ConnectionTrait>(
    conn: &C,
    stage_id: i32,
    status: PrimaryStatus,
    updated_at: DateTime<Utc>,
) -> Result<u64, DbErr> {
    let result = invoice::Entity::update_many()
        .col_expr(invoice::Column::PrimaryStatus, Expr::value(status))
        .col_expr(invoice::Column::UpdatedAt, Expr::value(updated_at))
        .col_expr(
            invoice::Column::Version,
            Expr::col(invoice::Column::Version).add(1),
        )
        .filter(invoice::Column::StageId.eq(stage_id))
        .filter(invoice::Column::PrimaryStatus.ne(status))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Extracted claim fields. `None` leaves the column as it is.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedFieldsUpdate {
    pub company_name: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub invoice_date: Option<chrono::NaiveDate>,
    pub description: Option<String>,
}

impl ExtractedFieldsUpdate {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.invoice_date.is_none()
            && self.description.is_none()
    }
}

/// Writes only the columns present in `fields`, plus `updated_at`.
pub async fn update_extracted_fields<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    fields: &ExtractedFieldsUpdate,
    updated_at: DateTime<Utc>,
) -> Result<bool, DbErr> {
    if fields.is_empty() {
        return Ok(false);
    }

    let mut update = invoice::Entity::update_many()
        .col_expr(invoice::Column::UpdatedAt, Expr::value(updated_at))
        .filter(invoice::Column::Id.eq(id));

    if let Some(ref company) = fields.company_name {
        update = update.col_expr(invoice::Column::CompanyName, Expr::value(company.clone()));
    }
    if let Some(ref amount) = fields.amount {
        update = update.col_expr(invoice::Column::Amount, Expr::value(amount.clone()));
    }
    if let Some(ref currency) = fields.currency {
        update = update.col_expr(invoice::Column::Currency, Expr::value(currency.clone()));
    }
    if let Some(date) = fields.invoice_date {
        update = update.col_expr(invoice::Column::InvoiceDate, Expr::value(date));
    }
    if let Some(ref description) = fields.description {
        update = update.col_expr(
            invoice::Column::Description,
            Expr::value(description.clone()),
        );
    }

    let result = update.exec(conn).await?;
    Ok(result.rows_affected == 1)
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64, DbErr> {
    let result = invoice::Entity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected)
}

/// Every invoice with only the columns needed for status cache checks.
pub async fn stage_pointers<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<(i32, i32, PrimaryStatus)>, DbErr> {
    invoice::Entity::find()
        .select_only()
        .column(invoice::Column::Id)
        .column(invoice::Column::StageId)
        .column(invoice::Column::PrimaryStatus)
        .order_by_asc(invoice::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}
