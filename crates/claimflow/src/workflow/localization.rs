//! Culture selection over the bilingual stage columns.
//!
//! Every display field of a stage has a default column and a `_de` column.
//! Callers pick a [`Culture`] per request and read through [`LocalizedStage`].

use std::fmt;

use serde::Serialize;

use crate::db::entities::stage::{self, PrimaryStatus};

/// Display language requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Culture {
    #[default]
    Default,
    German,
}

impl Culture {
    /// Parses a language tag such as `de`, `de-DE`, `de_AT` or `en-US`.
    ///
    /// Only the primary subtag is considered. Languages other than English
    /// and German are not supported.
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "de" => Some(Culture::German),
            "en" => Some(Culture::Default),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Culture::Default => "en",
            Culture::German => "de",
        }
    }

    /// Picks the German text when this culture is German and the variant is
    /// present, else the default text.
    pub fn pick<'a>(&self, default: &'a str, german: Option<&'a str>) -> &'a str {
        match (self, german) {
            (Culture::German, Some(de)) if !de.trim().is_empty() => de,
            _ => default,
        }
    }

    fn pick_opt<'a>(&self, default: Option<&'a str>, german: Option<&'a str>) -> Option<&'a str> {
        match (self, german) {
            (Culture::German, Some(de)) if !de.trim().is_empty() => Some(de),
            _ => default,
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Human-readable label of a status.
pub fn status_label(status: PrimaryStatus, culture: Culture) -> &'static str {
    match culture {
        Culture::Default => match status {
            PrimaryStatus::Draft => "Draft",
            PrimaryStatus::Submitted => "Submitted",
            PrimaryStatus::InReview => "In review",
            PrimaryStatus::Inquiry => "Inquiry",
            PrimaryStatus::Accepted => "Accepted",
            PrimaryStatus::Court => "Court",
            PrimaryStatus::Completed => "Completed",
            PrimaryStatus::CourtPrep => "Court preparation",
            PrimaryStatus::WaitingCourt => "Waiting for court",
            PrimaryStatus::DeadlineRunning => "Deadline running",
            PrimaryStatus::CourtResponse => "Court response",
            PrimaryStatus::EnforcementReady => "Ready for enforcement",
            PrimaryStatus::EnforcementInProgress => "Enforcement in progress",
            PrimaryStatus::Cancelled => "Cancelled",
            PrimaryStatus::Rejected => "Rejected",
        },
        Culture::German => match status {
            PrimaryStatus::Draft => "Entwurf",
            PrimaryStatus::Submitted => "Eingereicht",
            PrimaryStatus::InReview => "In Prüfung",
            PrimaryStatus::Inquiry => "Rückfrage",
            PrimaryStatus::Accepted => "Angenommen",
            PrimaryStatus::Court => "Gericht",
            PrimaryStatus::Completed => "Abgeschlossen",
            PrimaryStatus::CourtPrep => "Gerichtsvorbereitung",
            PrimaryStatus::WaitingCourt => "Warten auf Gericht",
            PrimaryStatus::DeadlineRunning => "Frist läuft",
            PrimaryStatus::CourtResponse => "Gerichtliche Stellungnahme",
            PrimaryStatus::EnforcementReady => "Vollstreckungsbereit",
            PrimaryStatus::EnforcementInProgress => "Vollstreckung läuft",
            PrimaryStatus::Cancelled => "Storniert",
            PrimaryStatus::Rejected => "Abgelehnt",
        },
    }
}

/// A stage rendered in one culture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedStage {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub next_steps: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub display_order: i32,
    pub primary_status: PrimaryStatus,
    pub status_label: String,
    pub culture: Culture,
}

impl LocalizedStage {
    pub fn new(stage: &stage::Model, culture: Culture) -> Self {
        Self {
            id: stage.id,
            slug: stage.slug.clone(),
            name: culture.pick(&stage.name, stage.name_de.as_deref()).to_string(),
            summary: culture
                .pick_opt(stage.summary.as_deref(), stage.summary_de.as_deref())
                .map(str::to_string),
            description: culture
                .pick_opt(stage.description.as_deref(), stage.description_de.as_deref())
                .map(str::to_string),
            next_steps: culture
                .pick_opt(stage.next_steps.as_deref(), stage.next_steps_de.as_deref())
                .map(str::to_string),
            icon: stage.icon.clone(),
            color: stage.color.clone(),
            display_order: stage.display_order,
            primary_status: stage.primary_status,
            status_label: status_label(stage.primary_status, culture).to_string(),
            culture,
        }
    }
}
