//! Client document repository: files attached to an invoice after submission.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use super::entities::client_document;

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
    uploaded_by_user_id: i32,
    filename: &str,
    path: &str,
    uploaded_at: chrono::DateTime<chrono::Utc>,
) -> Result<client_document::Model, DbErr> {
    client_document::ActiveModel {
        invoice_id: Set(invoice_id),
        uploaded_by_user_id: Set(uploaded_by_user_id),
        filename: Set(filename.to_string()),
        path: Set(path.to_string()),
        uploaded_at: Set(uploaded_at),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Documents of one invoice, oldest first.
pub async fn for_invoice<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<Vec<client_document::Model>, DbErr> {
    client_document::Entity::find()
        .filter(client_document::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(client_document::Column::UploadedAt)
        .order_by_asc(client_document::Column::Id)
        .all(conn)
        .await
}

pub(crate) async fn delete_for_invoice<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<u64, DbErr> {
    let result = client_document::Entity::delete_many()
        .filter(client_document::Column::InvoiceId.eq(invoice_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
