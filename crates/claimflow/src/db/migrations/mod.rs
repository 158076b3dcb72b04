//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20240301_000001_create_stages_table;
mod m20240301_000002_create_invoices_table;
mod m20240301_000003_create_stage_history_table;
mod m20240302_000001_create_client_documents_table;
mod m20240315_000001_add_version_to_invoices;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_stages_table::Migration),
            Box::new(m20240301_000002_create_invoices_table::Migration),
            Box::new(m20240301_000003_create_stage_history_table::Migration),
            Box::new(m20240302_000001_create_client_documents_table::Migration),
            Box::new(m20240315_000001_add_version_to_invoices::Migration),
        ]
    }
}
