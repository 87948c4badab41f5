use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{RowError, RowResult};
use crate::rows::progression::{self, RowUpdate, StatusPlan};
use crate::rows::{MakeModeStatus, NewRow, ProjectRow, RowPatch, RowType};
use crate::store::RowStore;

/// Result of asking for a make mode status change.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusOutcome {
    /// Changes were written; carries the reloaded rows.
    Applied(Vec<ProjectRow>),
    /// Nothing was written; the change needs the user's confirmation.
    NeedsConfirmation,
}

/// Persistence-backed row operations.
///
/// Multi-row operations issue one store write per row and always finish by
/// reloading the project, so callers see ground truth rather than an
/// optimistic local copy.
#[derive(Clone)]
pub struct RowService {
    store: Arc<dyn RowStore>,
}

fn require_id(id: &str) -> RowResult<()> {
    if id.trim().is_empty() {
        return Err(RowError::Validation("Row id cannot be empty".to_string()));
    }
    Ok(())
}

impl RowService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Loads a project's rows ordered by position.
    ///
    /// When no row or note is in progress, the first one that is not yet
    /// complete is promoted and that single update persisted.
    pub async fn fetch_rows(&self, project_id: i32) -> RowResult<Vec<ProjectRow>> {
        let mut rows = self.store.list_rows(project_id).await?;

        let promote = progression::cursor_to_restore(&rows).map(|row| row.id.clone());
        if let Some(id) = promote {
            debug!("Restoring make mode cursor on row {} (project {})", id, project_id);
            let patch = RowPatch::status(MakeModeStatus::InProgress);
            self.store.update_row(&id, patch.clone()).await?;
            if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
                row.apply(&patch);
            }
        }

        Ok(rows)
    }

    async fn apply_updates(&self, updates: Vec<RowUpdate>) -> RowResult<()> {
        for (id, patch) in updates {
            self.store.update_row(&id, patch).await?;
        }
        Ok(())
    }

    pub async fn update_make_mode_status(
        &self,
        project_id: i32,
        id: &str,
        status: MakeModeStatus,
    ) -> RowResult<StatusOutcome> {
        require_id(id)?;

        let rows = self.store.list_rows(project_id).await?;
        match progression::plan_status_change(&rows, id, status)? {
            StatusPlan::NeedsConfirmation => Ok(StatusOutcome::NeedsConfirmation),
            StatusPlan::Unchanged => Ok(StatusOutcome::Applied(self.fetch_rows(project_id).await?)),
            StatusPlan::Apply(updates) => {
                debug!(
                    "Setting row {} to {} ({} writes)",
                    id,
                    status.as_str(),
                    updates.len()
                );
                self.apply_updates(updates).await?;
                Ok(StatusOutcome::Applied(self.fetch_rows(project_id).await?))
            }
        }
    }

    /// Confirmed un-complete: `id` becomes the cursor again and every row or
    /// note after it goes back to not started.
    pub async fn uncomplete(&self, project_id: i32, id: &str) -> RowResult<Vec<ProjectRow>> {
        require_id(id)?;

        let rows = self.store.list_rows(project_id).await?;
        let updates = progression::uncomplete_updates(&rows, id)?;
        info!("Un-completing row {} ({} writes)", id, updates.len());
        self.apply_updates(updates).await?;
        self.fetch_rows(project_id).await
    }

    /// Moves the row at index `from` to `to` (indices into the position
    /// ordered rows), renumbers positions and restarts make mode progress.
    pub async fn reorder_rows(
        &self,
        project_id: i32,
        from: usize,
        to: usize,
    ) -> RowResult<Vec<ProjectRow>> {
        let rows = self.store.list_rows(project_id).await?;
        if from == to {
            return Ok(rows);
        }

        let reordered = progression::reorder(&rows, from, to)?;
        for row in &reordered {
            self.store
                .update_row(&row.id, RowPatch::position(row.position))
                .await?;
        }

        self.apply_updates(progression::progress_reset_updates(&reordered))
            .await?;
        info!("Reordered rows of project {}: {} -> {}", project_id, from, to);

        self.fetch_rows(project_id).await
    }

    /// Writes a single-field (or few-field) patch to one row.
    pub async fn update_fields(&self, id: &str, patch: RowPatch) -> RowResult<()> {
        require_id(id)?;
        for (name, value) in [
            ("counter", patch.counter),
            ("make_mode_counter", patch.make_mode_counter),
        ] {
            if matches!(value, Some(v) if v < 0) {
                return Err(RowError::Validation(format!("{} cannot be negative", name)));
            }
        }
        self.store.update_row(id, patch).await
    }

    pub async fn get_row(&self, id: &str) -> RowResult<ProjectRow> {
        require_id(id)?;
        self.store.get_row(id).await
    }

    /// Shifts every row at or after `from` down by one position, last first.
    async fn open_gap(&self, rows: &[ProjectRow], from: i32) -> RowResult<()> {
        let mut shifted: Vec<&ProjectRow> = rows.iter().filter(|row| row.position >= from).collect();
        shifted.sort_by_key(|row| std::cmp::Reverse(row.position));
        for row in shifted {
            self.store
                .update_row(&row.id, RowPatch::position(row.position + 1))
                .await?;
        }
        Ok(())
    }

    /// Inserts a blank row, note or divider after position `after`, or at
    /// the end when `after` is `None`.
    pub async fn insert_row(
        &self,
        project_id: i32,
        after: Option<i32>,
        row_type: RowType,
    ) -> RowResult<ProjectRow> {
        let rows = self.store.list_rows(project_id).await?;
        let position = progression::insert_position(&rows, after);

        self.open_gap(&rows, position).await?;
        let row = self
            .store
            .insert_row(NewRow::blank(project_id, row_type, position))
            .await?;
        info!(
            "Added {} at position {} in project {}",
            row_type.as_str(),
            position,
            project_id
        );
        Ok(row)
    }

    /// Copies a row's authored content into a new row directly after it.
    pub async fn duplicate_row(&self, id: &str) -> RowResult<ProjectRow> {
        let source = self.get_row(id).await?;
        let rows = self.store.list_rows(source.project_id).await?;
        let position = source.position + 1;

        self.open_gap(&rows, position).await?;
        let row = self
            .store
            .insert_row(NewRow::copy_of(&source, position))
            .await?;
        info!("Duplicated row {} as {}", source.id, row.id);
        Ok(row)
    }

    /// Deletes a row and closes the gap it leaves.
    pub async fn delete_row(&self, id: &str) -> RowResult<ProjectRow> {
        let row = self.get_row(id).await?;
        self.store.delete_row(id).await?;

        let mut following: Vec<ProjectRow> = self
            .store
            .list_rows(row.project_id)
            .await?
            .into_iter()
            .filter(|other| other.position > row.position)
            .collect();
        following.sort_by_key(|other| other.position);
        for other in following {
            self.store
                .update_row(&other.id, RowPatch::position(other.position - 1))
                .await?;
        }

        info!("Deleted row {} from project {}", row.id, row.project_id);
        Ok(row)
    }
}
