//! Migration to create the invoices table.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20240301_000001_create_stages_table::Stages;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(pk_auto(Invoices::Id))
                    .col(integer(Invoices::UserId).not_null())
                    .col(string(Invoices::FilePath).not_null())
                    .col(string_null(Invoices::PowerOfAttorneyPath))
                    .col(string_null(Invoices::CompanyName))
                    .col(string_null(Invoices::Amount))
                    .col(string_null(Invoices::Currency))
                    .col(date_null(Invoices::InvoiceDate))
                    .col(text_null(Invoices::Description))
                    .col(string(Invoices::TicketNumber).not_null().unique_key())
                    .col(integer(Invoices::StageId).not_null())
                    .col(string(Invoices::PrimaryStatus).not_null())
                    .col(timestamp_with_time_zone(Invoices::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Invoices::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_stage")
                            .from(Invoices::Table, Invoices::StageId)
                            .to(Stages::Table, Stages::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Owner dashboards filter by user, admin dashboards group by status
        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_user_id")
                    .table(Invoices::Table)
                    .col(Invoices::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_stage_id")
                    .table(Invoices::Table)
                    .col(Invoices::StageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_user_status")
                    .table(Invoices::Table)
                    .col(Invoices::UserId)
                    .col(Invoices::PrimaryStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_created_at")
                    .table(Invoices::Table)
                    .col(Invoices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Invoices {
    Table,
    Id,
    UserId,
    FilePath,
    PowerOfAttorneyPath,
    CompanyName,
    Amount,
    Currency,
    InvoiceDate,
    Description,
    TicketNumber,
    StageId,
    PrimaryStatus,
    CreatedAt,
    UpdatedAt,
}
