//! Migration to create the stage transition ledger.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20240301_000001_create_stages_table::Stages;
use super::m20240301_000002_create_invoices_table::Invoices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StageHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(StageHistory::Id))
                    .col(integer(StageHistory::InvoiceId).not_null())
                    .col(integer(StageHistory::StageId).not_null())
                    .col(integer_null(StageHistory::ChangedByUserId))
                    .col(string(StageHistory::ChangedByName).not_null())
                    .col(timestamp_with_time_zone(StageHistory::ChangedAt).not_null())
                    .col(text_null(StageHistory::Note))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stage_history_invoice")
                            .from(StageHistory::Table, StageHistory::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stage_history_stage")
                            .from(StageHistory::Table, StageHistory::StageId)
                            .to(Stages::Table, Stages::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index for the common query: one invoice's ledger in order
        manager
            .create_index(
                Index::create()
                    .name("idx_stage_history_invoice_changed_at")
                    .table(StageHistory::Table)
                    .col(StageHistory::InvoiceId)
                    .col(StageHistory::ChangedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stage_history_stage_id")
                    .table(StageHistory::Table)
                    .col(StageHistory::StageId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StageHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StageHistory {
    Table,
    Id,
    InvoiceId,
    StageId,
    ChangedByUserId,
    ChangedByName,
    ChangedAt,
    Note,
}
