//! Test harness for isolated test execution.
//!
//! Every `TestHarness` owns a temporary directory holding its own SQLite file,
//! so tests run against the same connect-and-migrate path as the server.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use claimflow::db::entities::{invoice, stage};
use claimflow::db::{sqlite_url, Database};
use claimflow::workflow::{self, Actor, NewInvoice, StageDefinition};

pub struct TestHarness {
    /// Keeps the database directory alive for the lifetime of the test.
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
}

impl TestHarness {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("claimflow.db");
        let db = Database::connect(&sqlite_url(&db_path))
            .await
            .expect("Failed to open test database");

        Self {
            temp_dir,
            db_path,
            db,
        }
    }

    /// Creates stages in the given order.
    pub async fn with_stages(definitions: Vec<StageDefinition>) -> (Self, Vec<stage::Model>) {
        let harness = Self::new().await;
        let mut stages = Vec::with_capacity(definitions.len());
        for definition in definitions {
            stages.push(
                workflow::create_stage(&harness.db, definition)
                    .await
                    .expect("Failed to create stage"),
            );
        }
        (harness, stages)
    }

    /// Submits an invoice for `user_id` acting as that user.
    pub async fn submit(&self, new_invoice: NewInvoice) -> invoice::Model {
        let actor = Actor::user(new_invoice.user_id, format!("user-{}", new_invoice.user_id));
        workflow::submit_invoice(&self.db, new_invoice, &actor)
            .await
            .expect("Failed to submit invoice")
    }

    pub async fn reload(&self, invoice_id: i32) -> invoice::Model {
        workflow::get_invoice(&self.db, invoice_id)
            .await
            .expect("Failed to load invoice")
            .expect("Invoice disappeared")
    }
}
