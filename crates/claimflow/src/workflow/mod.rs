//! Invoice workflow engine.
//!
//! Stages form an ordered catalog; invoices move between any two stages
//! through [`transition::change_stage`], which keeps the cached status and the
//! append-only ledger in step.

pub mod catalog;
pub mod consistency;
pub mod dashboard;
pub mod invoices;
pub mod localization;
pub mod seed;
pub mod transition;

pub use catalog::{
    create_stage, delete_stage, find_stage_by_slug, get_stage, list_stages, move_stage,
    stages_with_status, update_stage, StageDefinition,
};
pub use consistency::{verify_status_cache, StatusDrift};
pub use dashboard::{stage_counts, summarize, StageCount};
pub use invoices::{
    add_document, delete_invoice, documents, get_invoice, history, invoice_detail, list_invoices,
    submit_invoice, InvoiceDetail, InvoicePage, NewInvoice,
};
pub use localization::{status_label, Culture, LocalizedStage};
pub use seed::seed_default_stages;
pub use transition::{change_stage, Actor, StageChange};
