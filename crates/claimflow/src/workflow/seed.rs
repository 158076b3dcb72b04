//! Default catalog installed on first start.

use crate::db::entities::stage::PrimaryStatus;
use crate::db::{stage_repo, Database};
use crate::error::WorkflowError;
use crate::workflow::catalog::{insert_stage, StageDefinition};
use crate::workflow::localization::{status_label, Culture};

/// Spacing between seeded display orders, leaving room for custom stages.
const ORDER_STEP: i32 = 10;

struct DefaultStage {
    status: PrimaryStatus,
    icon: &'static str,
    color: &'static str,
    next_steps: &'static str,
    next_steps_de: &'static str,
}

/// One stage per status, in workflow order.
const DEFAULT_STAGES: [DefaultStage; 15] = [
    DefaultStage {
        status: PrimaryStatus::Draft,
        icon: "file",
        color: "gray",
        next_steps: "Complete and submit your claim.",
        next_steps_de: "Vervollständigen und reichen Sie Ihre Forderung ein.",
    },
    DefaultStage {
        status: PrimaryStatus::Submitted,
        icon: "inbox",
        color: "blue",
        next_steps: "We will review your claim shortly.",
        next_steps_de: "Wir prüfen Ihre Forderung in Kürze.",
    },
    DefaultStage {
        status: PrimaryStatus::InReview,
        icon: "search",
        color: "blue",
        next_steps: "No action required.",
        next_steps_de: "Keine Aktion erforderlich.",
    },
    DefaultStage {
        status: PrimaryStatus::Inquiry,
        icon: "help-circle",
        color: "orange",
        next_steps: "Please answer our questions.",
        next_steps_de: "Bitte beantworten Sie unsere Rückfragen.",
    },
    DefaultStage {
        status: PrimaryStatus::Accepted,
        icon: "check",
        color: "green",
        next_steps: "We are contacting the debtor.",
        next_steps_de: "Wir kontaktieren den Schuldner.",
    },
    DefaultStage {
        status: PrimaryStatus::CourtPrep,
        icon: "folder",
        color: "purple",
        next_steps: "We are preparing the court filing.",
        next_steps_de: "Wir bereiten die Klage vor.",
    },
    DefaultStage {
        status: PrimaryStatus::Court,
        icon: "scale",
        color: "purple",
        next_steps: "The claim is before the court.",
        next_steps_de: "Die Forderung liegt dem Gericht vor.",
    },
    DefaultStage {
        status: PrimaryStatus::WaitingCourt,
        icon: "clock",
        color: "purple",
        next_steps: "Waiting for the court.",
        next_steps_de: "Wir warten auf das Gericht.",
    },
    DefaultStage {
        status: PrimaryStatus::DeadlineRunning,
        icon: "hourglass",
        color: "yellow",
        next_steps: "A deadline is running.",
        next_steps_de: "Eine Frist läuft.",
    },
    DefaultStage {
        status: PrimaryStatus::CourtResponse,
        icon: "message-square",
        color: "purple",
        next_steps: "The court has responded.",
        next_steps_de: "Das Gericht hat geantwortet.",
    },
    DefaultStage {
        status: PrimaryStatus::EnforcementReady,
        icon: "flag",
        color: "red",
        next_steps: "Enforcement can begin.",
        next_steps_de: "Die Vollstreckung kann beginnen.",
    },
    DefaultStage {
        status: PrimaryStatus::EnforcementInProgress,
        icon: "zap",
        color: "red",
        next_steps: "Enforcement is in progress.",
        next_steps_de: "Die Vollstreckung läuft.",
    },
    DefaultStage {
        status: PrimaryStatus::Completed,
        icon: "check-circle",
        color: "green",
        next_steps: "Nothing left to do.",
        next_steps_de: "Nichts weiter zu tun.",
    },
    DefaultStage {
        status: PrimaryStatus::Cancelled,
        icon: "x",
        color: "gray",
        next_steps: "The claim was withdrawn.",
        next_steps_de: "Die Forderung wurde zurückgezogen.",
    },
    DefaultStage {
        status: PrimaryStatus::Rejected,
        icon: "x-circle",
        color: "red",
        next_steps: "The claim could not be accepted.",
        next_steps_de: "Die Forderung konnte nicht angenommen werden.",
    },
];

impl DefaultStage {
    fn definition(&self, display_order: i32) -> StageDefinition {
        let mut definition = StageDefinition::new(
            status_label(self.status, Culture::Default),
            self.status.as_str().replace('_', "-"),
            self.status,
        )
        .with_display_order(display_order)
        .with_name_de(status_label(self.status, Culture::German));
        definition.icon = Some(self.icon.to_string());
        definition.color = Some(self.color.to_string());
        definition.next_steps = Some(self.next_steps.to_string());
        definition.next_steps_de = Some(self.next_steps_de.to_string());
        definition
    }
}

/// Populates an empty catalog with one stage per status.
///
/// Returns the number of stages created; a non-empty catalog is left alone.
/// All stages are written in one transaction.
pub async fn seed_default_stages(db: &Database) -> Result<usize, WorkflowError> {
    let txn = db.begin().await?;
    if stage_repo::count(&txn).await? > 0 {
        log::debug!("Stage catalog already populated, skipping seed");
        return Ok(0);
    }

    for (order, defaults) in (1..).map(|n| n * ORDER_STEP).zip(DEFAULT_STAGES.iter()) {
        insert_stage(&txn, defaults.definition(order)).await?;
    }
    txn.commit().await?;

    log::info!("Seeded {} default stages", DEFAULT_STAGES.len());
    Ok(DEFAULT_STAGES.len())
}
