//! Initial migration to create the stage catalog.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stages::Table)
                    .if_not_exists()
                    .col(pk_auto(Stages::Id))
                    .col(string(Stages::Name).not_null())
                    .col(string_null(Stages::NameDe))
                    .col(string(Stages::Slug).not_null().unique_key())
                    .col(text_null(Stages::Summary))
                    .col(text_null(Stages::SummaryDe))
                    .col(text_null(Stages::Description))
                    .col(text_null(Stages::DescriptionDe))
                    .col(text_null(Stages::NextSteps))
                    .col(text_null(Stages::NextStepsDe))
                    .col(string_null(Stages::Icon))
                    .col(string_null(Stages::Color))
                    .col(integer(Stages::DisplayOrder).not_null())
                    .col(string(Stages::PrimaryStatus).not_null())
                    .col(timestamp_with_time_zone(Stages::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Stages::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        // Catalog listing is always ordered by display order
        manager
            .create_index(
                Index::create()
                    .name("idx_stages_display_order")
                    .table(Stages::Table)
                    .col(Stages::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stages_primary_status")
                    .table(Stages::Table)
                    .col(Stages::PrimaryStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Stages {
    Table,
    Id,
    Name,
    NameDe,
    Slug,
    Summary,
    SummaryDe,
    Description,
    DescriptionDe,
    NextSteps,
    NextStepsDe,
    Icon,
    Color,
    DisplayOrder,
    PrimaryStatus,
    CreatedAt,
    UpdatedAt,
}
