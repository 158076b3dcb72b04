//! Builders for creating test data without repetitive boilerplate.

#![allow(dead_code)]

use claimflow::workflow::{NewInvoice, StageDefinition};
use claimflow::PrimaryStatus;

/// Stage definition whose slug is derived from the name.
pub fn stage(name: &str, status: PrimaryStatus) -> StageDefinition {
    StageDefinition::new(name, name.to_ascii_lowercase().replace(' ', "-"), status)
}

/// The three-stage catalog used by the workflow scenarios.
pub fn basic_catalog() -> Vec<StageDefinition> {
    vec![
        stage("Submitted", PrimaryStatus::Submitted),
        stage("InReview", PrimaryStatus::InReview),
        stage("Accepted", PrimaryStatus::Accepted),
    ]
}

pub struct InvoiceBuilder {
    invoice: NewInvoice,
}

impl InvoiceBuilder {
    pub fn new(user_id: i32) -> Self {
        Self {
            invoice: NewInvoice::new(user_id, format!("/uploads/{}/invoice.pdf", user_id)),
        }
    }

    pub fn stage(mut self, stage_id: i32) -> Self {
        self.invoice.stage_id = Some(stage_id);
        self
    }

    pub fn company(mut self, company: &str) -> Self {
        self.invoice.company_name = Some(company.to_string());
        self
    }

    pub fn amount(mut self, amount: &str) -> Self {
        self.invoice.amount = Some(amount.to_string());
        self
    }

    pub fn build(self) -> NewInvoice {
        self.invoice
    }
}
