//! Stage catalog management: the ordered list of workflow stages.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use sea_orm::{ActiveValue::Set, ConnectionTrait, IntoActiveModel};
use serde::Deserialize;
use tracing::{info_span, Instrument};

use crate::db::entities::stage::{self, PrimaryStatus};
use crate::db::{history_repo, invoice_repo, stage_repo, Database};
use crate::error::WorkflowError;
use crate::workflow::transition::restamp_stage_members;

static RE_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Editable fields of a stage, as submitted by an administrator.
#[derive(Debug, Clone, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    #[serde(default)]
    pub name_de: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub summary_de: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_de: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub next_steps_de: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Position in the catalog. New stages without one are appended.
    #[serde(default)]
    pub display_order: Option<i32>,
    pub primary_status: PrimaryStatus,
}

impl StageDefinition {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, status: PrimaryStatus) -> Self {
        Self {
            name: name.into(),
            name_de: None,
            slug: slug.into(),
            summary: None,
            summary_de: None,
            description: None,
            description_de: None,
            next_steps: None,
            next_steps_de: None,
            icon: None,
            color: None,
            display_order: None,
            primary_status: status,
        }
    }

    pub fn with_display_order(mut self, order: i32) -> Self {
        self.display_order = Some(order);
        self
    }

    pub fn with_name_de(mut self, name_de: impl Into<String>) -> Self {
        self.name_de = Some(name_de.into());
        self
    }

    /// Trims the identifying fields and rejects malformed definitions.
    fn normalized(mut self) -> Result<Self, WorkflowError> {
        self.name = self.name.trim().to_string();
        self.slug = self.slug.trim().to_string();

        if self.name.is_empty() {
            return Err(WorkflowError::Validation(
                "Stage name must not be empty".to_string(),
            ));
        }
        if self.slug.is_empty() {
            return Err(WorkflowError::Validation(
                "Stage slug must not be empty".to_string(),
            ));
        }
        if !is_valid_slug(&self.slug) {
            return Err(WorkflowError::Validation(format!(
                "Stage slug '{}' may only contain letters, digits, '-' and '_'",
                self.slug
            )));
        }

        Ok(self)
    }
}

/// URL-safe slug check: ASCII letters, digits, `-` and `_`.
pub fn is_valid_slug(slug: &str) -> bool {
    RE_SLUG.is_match(slug)
}

/// Blank optional text is stored as NULL.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// All stages in display order.
pub async fn list_stages(db: &Database) -> Result<Vec<stage::Model>, WorkflowError> {
    Ok(stage_repo::list_ordered(db.conn()).await?)
}

pub async fn get_stage(db: &Database, id: i32) -> Result<Option<stage::Model>, WorkflowError> {
    Ok(stage_repo::find_by_id(db.conn(), id).await?)
}

pub async fn find_stage_by_slug(
    db: &Database,
    slug: &str,
) -> Result<Option<stage::Model>, WorkflowError> {
    Ok(stage_repo::find_by_slug(db.conn(), slug).await?)
}

/// Candidate targets restricted to one status, e.g. the stages offered by an
/// inquiry dialog.
pub async fn stages_with_status(
    db: &Database,
    status: PrimaryStatus,
) -> Result<Vec<stage::Model>, WorkflowError> {
    Ok(stage_repo::list_by_status(db.conn(), status).await?)
}

pub async fn create_stage(
    db: &Database,
    definition: StageDefinition,
) -> Result<stage::Model, WorkflowError> {
    let span = info_span!("create_stage", slug = %definition.slug);
    async move {
        let txn = db.begin().await?;
        let created = insert_stage(&txn, definition).await?;
        txn.commit().await?;
        log::info!(
            "Created stage '{}' (id {}, {})",
            created.slug,
            created.id,
            created.primary_status
        );
        Ok(created)
    }
    .instrument(span)
    .await
}

/// Validates and inserts one stage inside the caller's transaction.
pub(crate) async fn insert_stage<C: ConnectionTrait>(
    conn: &C,
    definition: StageDefinition,
) -> Result<stage::Model, WorkflowError> {
    let definition = definition.normalized()?;

    if stage_repo::slug_taken(conn, &definition.slug, None).await? {
        return Err(WorkflowError::DuplicateSlug(definition.slug));
    }

    let display_order = match definition.display_order {
        Some(order) => order,
        None => match stage_repo::max_display_order(conn).await? {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                WorkflowError::Validation(
                    "No display order left after the last stage; supply one explicitly"
                        .to_string(),
                )
            })?,
        },
    };

    let now = Utc::now();
    let created = stage_repo::insert(
        conn,
        stage::ActiveModel {
            name: Set(definition.name),
            name_de: Set(text(definition.name_de)),
            slug: Set(definition.slug),
            summary: Set(text(definition.summary)),
            summary_de: Set(text(definition.summary_de)),
            description: Set(text(definition.description)),
            description_de: Set(text(definition.description_de)),
            next_steps: Set(text(definition.next_steps)),
            next_steps_de: Set(text(definition.next_steps_de)),
            icon: Set(text(definition.icon)),
            color: Set(text(definition.color)),
            display_order: Set(display_order),
            primary_status: Set(definition.primary_status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        },
    )
    .await?;
    Ok(created)
}

/// Replaces the editable fields of a stage. The display order is kept when the
/// definition does not carry one.
pub async fn update_stage(
    db: &Database,
    id: i32,
    definition: StageDefinition,
) -> Result<stage::Model, WorkflowError> {
    let span = info_span!("update_stage", stage_id = id);
    async move {
        let definition = definition.normalized()?;
        let txn = db.begin().await?;

        let existing = stage_repo::find_by_id(&txn, id)
            .await?
            .ok_or_else(|| WorkflowError::stage_not_found(id))?;

        if stage_repo::slug_taken(&txn, &definition.slug, Some(id)).await? {
            return Err(WorkflowError::DuplicateSlug(definition.slug));
        }

        let status_changed = existing.primary_status != definition.primary_status;
        let display_order = definition.display_order.unwrap_or(existing.display_order);

        let mut model = existing.into_active_model();
        model.name = Set(definition.name);
        model.name_de = Set(text(definition.name_de));
        model.slug = Set(definition.slug);
        model.summary = Set(text(definition.summary));
        model.summary_de = Set(text(definition.summary_de));
        model.description = Set(text(definition.description));
        model.description_de = Set(text(definition.description_de));
        model.next_steps = Set(text(definition.next_steps));
        model.next_steps_de = Set(text(definition.next_steps_de));
        model.icon = Set(text(definition.icon));
        model.color = Set(text(definition.color));
        model.display_order = Set(display_order);
        model.primary_status = Set(definition.primary_status);
        let now = Utc::now();
        model.updated_at = Set(now);

        let updated = stage_repo::update(&txn, model).await?;
        let restamped = if status_changed {
            restamp_stage_members(&txn, &updated, now).await?
        } else {
            0
        };
        txn.commit().await?;

        if status_changed {
            log::info!(
                "Stage {} reclassified as {}; {} invoice(s) updated",
                updated.id,
                updated.primary_status,
                restamped
            );
        }

        Ok(updated)
    }
    .instrument(span)
    .await
}

/// Deletes a stage that no invoice and no ledger row refers to.
pub async fn delete_stage(db: &Database, id: i32) -> Result<(), WorkflowError> {
    let span = info_span!("delete_stage", stage_id = id);
    async move {
        let txn = db.begin().await?;

        if stage_repo::find_by_id(&txn, id).await?.is_none() {
            return Err(WorkflowError::stage_not_found(id));
        }

        let invoices = invoice_repo::count_in_stage(&txn, id).await?;
        let history = history_repo::count_for_stage(&txn, id).await?;
        if invoices > 0 || history > 0 {
            log::info!(
                "Refusing to delete stage {}: {} invoices, {} history rows",
                id,
                invoices,
                history
            );
            return Err(WorkflowError::InUse {
                stage_id: id,
                invoices,
                history,
            });
        }

        stage_repo::delete(&txn, id).await?;
        txn.commit().await?;
        log::info!("Deleted stage {}", id);
        Ok(())
    }
    .instrument(span)
    .await
}

/// Swaps the display order of stage `id` with the stage `offset` positions
/// away in the ordered catalog.
///
/// Returns `false` when the stage does not exist, `offset` is zero, or the
/// target position falls outside the catalog.
pub async fn move_stage(db: &Database, id: i32, offset: i32) -> Result<bool, WorkflowError> {
    if offset == 0 {
        return Ok(false);
    }

    let span = info_span!("move_stage", stage_id = id, offset);
    async move {
        let txn = db.begin().await?;
        let stages = stage_repo::list_ordered(&txn).await?;

        let Some(index) = stages.iter().position(|s| s.id == id) else {
            return Ok(false);
        };
        let target = index as i64 + i64::from(offset);
        if target < 0 || target >= stages.len() as i64 {
            return Ok(false);
        }
        let target = target as usize;

        let now = Utc::now();
        let (current, other) = (&stages[index], &stages[target]);

        if current.display_order == other.display_order {
            // Equal orders cannot be swapped observably; renumber everything.
            let mut ids: Vec<i32> = stages.iter().map(|s| s.id).collect();
            ids.swap(index, target);
            for (position, stage_id) in ids.into_iter().enumerate() {
                stage_repo::set_display_order(&txn, stage_id, position as i32 + 1, now).await?;
            }
        } else {
            stage_repo::set_display_order(&txn, current.id, other.display_order, now).await?;
            stage_repo::set_display_order(&txn, other.id, current.display_order, now).await?;
        }

        txn.commit().await?;
        log::debug!("Moved stage {} by {}", id, offset);
        Ok(true)
    }
    .instrument(span)
    .await
}
