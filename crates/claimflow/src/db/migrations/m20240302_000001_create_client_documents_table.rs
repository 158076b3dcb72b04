//! Migration to create the invoice client documents table.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20240301_000002_create_invoices_table::Invoices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InvoiceClientDocuments::Table)
                    .if_not_exists()
                    .col(pk_auto(InvoiceClientDocuments::Id))
                    .col(integer(InvoiceClientDocuments::InvoiceId).not_null())
                    .col(integer(InvoiceClientDocuments::UploadedByUserId).not_null())
                    .col(string(InvoiceClientDocuments::Filename).not_null())
                    .col(string(InvoiceClientDocuments::Path).not_null())
                    .col(timestamp_with_time_zone(InvoiceClientDocuments::UploadedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_documents_invoice")
                            .from(
                                InvoiceClientDocuments::Table,
                                InvoiceClientDocuments::InvoiceId,
                            )
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_documents_invoice_id")
                    .table(InvoiceClientDocuments::Table)
                    .col(InvoiceClientDocuments::InvoiceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InvoiceClientDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InvoiceClientDocuments {
    Table,
    Id,
    InvoiceId,
    UploadedByUserId,
    Filename,
    Path,
    UploadedAt,
}
