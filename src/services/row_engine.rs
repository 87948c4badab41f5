use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::row_service::{RowService, StatusOutcome};
use crate::errors::{RowError, RowResult};
use crate::notifications::Notifier;
use crate::preferences::{PreferenceStore, Preferences};
use crate::rows::progression::filter_for_display;
use crate::rows::{DisplayView, MakeModeStatus, ProjectRow, RowPatch, RowType, ViewMode};
use crate::store::RowStore;

/// An operation held back until the user confirms it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConfirmableAction {
    Uncomplete { row_id: String },
}

impl ConfirmableAction {
    pub fn message(&self) -> &'static str {
        match self {
            ConfirmableAction::Uncomplete { .. } => {
                "Mark this row as in progress? Progress on every row after it will be reset."
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmDialog {
    pub open: bool,
    pub action: Option<ConfirmableAction>,
}

/// What happened to a requested make mode status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    Applied,
    AwaitingConfirmation,
    Failed,
}

/// Row list state for one project view.
///
/// Every operation reports failures as error toasts and logs them; nothing
/// is returned as an error to the caller. Cascading operations reload the
/// project afterwards, successful or not.
pub struct RowEngine {
    service: RowService,
    notifier: Notifier,
    preferences: Arc<dyn PreferenceStore>,
    project_id: i32,
    mode: ViewMode,
    hide_completed: bool,
    rows: Vec<ProjectRow>,
    loading: bool,
    pending: Option<ConfirmableAction>,
}

impl RowEngine {
    pub fn new(
        store: Arc<dyn RowStore>,
        preferences: Arc<dyn PreferenceStore>,
        notifier: Notifier,
        project_id: i32,
    ) -> Self {
        let hide_completed = preferences.load().hide_completed;
        Self {
            service: RowService::new(store),
            notifier,
            preferences,
            project_id,
            mode: ViewMode::default(),
            hide_completed,
            rows: Vec::new(),
            loading: true,
            pending: None,
        }
    }

    pub fn project_id(&self) -> i32 {
        self.project_id
    }

    /// All rows of the project, ordered by position.
    pub fn rows(&self) -> &[ProjectRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn hide_completed(&self) -> bool {
        self.hide_completed
    }

    pub fn set_hide_completed(&mut self, hide_completed: bool) {
        self.hide_completed = hide_completed;
        if let Err(e) = self.preferences.save(&Preferences { hide_completed }) {
            warn!("Failed to save hide-completed preference: {}", e);
        }
    }

    pub fn toggle_hide_completed(&mut self) {
        self.set_hide_completed(!self.hide_completed);
    }

    pub fn view(&self) -> DisplayView {
        filter_for_display(&self.rows, self.hide_completed, self.mode)
    }

    pub fn confirm_dialog(&self) -> ConfirmDialog {
        ConfirmDialog {
            open: self.pending.is_some(),
            action: self.pending.clone(),
        }
    }

    fn report(&self, message: &str, err: &RowError) {
        warn!("{} (project {}): {}", message, self.project_id, err);
        self.notifier.error(message);
    }

    /// Replaces local rows with the stored ones.
    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let loaded = match self.service.fetch_rows(self.project_id).await {
            Ok(rows) => {
                debug!("Loaded {} rows for project {}", rows.len(), self.project_id);
                self.rows = rows;
                true
            }
            Err(e) => {
                self.report("Failed to load rows", &e);
                false
            }
        };
        self.loading = false;
        loaded
    }

    /// Applies the result of a cascading operation, reloading on failure.
    async fn settle_cascade(&mut self, result: RowResult<Vec<ProjectRow>>, failure: &str) -> bool {
        match result {
            Ok(rows) => {
                self.rows = rows;
                true
            }
            Err(e) => {
                self.report(failure, &e);
                self.load().await;
                false
            }
        }
    }

    pub async fn update_make_mode_status(&mut self, id: &str, status: MakeModeStatus) -> StatusChange {
        let outcome = self
            .service
            .update_make_mode_status(self.project_id, id, status)
            .await;

        match outcome {
            Ok(StatusOutcome::Applied(rows)) => {
                self.rows = rows;
                StatusChange::Applied
            }
            Ok(StatusOutcome::NeedsConfirmation) => {
                self.pending = Some(ConfirmableAction::Uncomplete {
                    row_id: id.to_string(),
                });
                StatusChange::AwaitingConfirmation
            }
            Err(e) => {
                self.report("Failed to update row status", &e);
                self.load().await;
                StatusChange::Failed
            }
        }
    }

    /// Runs the pending action. Returns false when nothing was pending or
    /// the action failed.
    pub async fn confirm(&mut self) -> bool {
        let Some(action) = self.pending.take() else {
            return false;
        };

        match action {
            ConfirmableAction::Uncomplete { row_id } => {
                let result = self.service.uncomplete(self.project_id, &row_id).await;
                self.settle_cascade(result, "Failed to update row status").await
            }
        }
    }

    /// Closes the confirmation dialog without touching any row.
    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    /// Moves the row shown at `from` to where the row at `to` is shown.
    ///
    /// Indices refer to the current view, which may hide completed rows.
    pub async fn reorder_rows(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return true;
        }

        let view = self.view();
        let full_index = |view_index: usize| {
            view.rows
                .get(view_index)
                .and_then(|shown| self.rows.iter().position(|row| row.id == shown.id))
                .ok_or(RowError::IndexOutOfRange {
                    index: view_index,
                    len: view.rows.len(),
                })
        };

        let indices = full_index(from).and_then(|from| full_index(to).map(|to| (from, to)));
        let result = match indices {
            Ok((from, to)) => self.service.reorder_rows(self.project_id, from, to).await,
            Err(e) => Err(e),
        };
        let reordered = self.settle_cascade(result, "Failed to reorder rows").await;
        if reordered {
            self.notifier
                .info("Rows reordered; make mode progress starts again from the first row");
        }
        reordered
    }

    async fn update_field(&mut self, id: &str, patch: RowPatch, field: &str) -> bool {
        match self.service.update_fields(id, patch.clone()).await {
            Ok(()) => {
                if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
                    row.apply(&patch);
                }
                true
            }
            Err(e) => {
                self.report(&format!("Failed to update {}", field), &e);
                false
            }
        }
    }

    fn local_row(&self, id: &str, field: &str) -> Option<&ProjectRow> {
        let row = self.rows.iter().find(|row| row.id == id);
        if row.is_none() {
            self.report(
                &format!("Failed to update {}", field),
                &RowError::NotFound(id.to_string()),
            );
        }
        row
    }

    pub async fn update_counter(&mut self, id: &str, counter: i32) -> bool {
        let patch = RowPatch {
            counter: Some(counter),
            ..Default::default()
        };
        self.update_field(id, patch, "counter").await
    }

    pub async fn increment_counter(&mut self, id: &str) -> bool {
        let Some(counter) = self.local_row(id, "counter").map(|row| row.counter) else {
            return false;
        };
        self.update_counter(id, counter.saturating_add(1)).await
    }

    pub async fn decrement_counter(&mut self, id: &str) -> bool {
        let Some(counter) = self.local_row(id, "counter").map(|row| row.counter) else {
            return false;
        };
        if counter <= 0 {
            return true;
        }
        self.update_counter(id, counter - 1).await
    }

    pub async fn update_make_mode_counter(&mut self, id: &str, counter: i32) -> bool {
        let patch = RowPatch {
            make_mode_counter: Some(counter),
            ..Default::default()
        };
        self.update_field(id, patch, "make mode counter").await
    }

    pub async fn increment_make_mode_counter(&mut self, id: &str) -> bool {
        let Some(counter) = self
            .local_row(id, "make mode counter")
            .map(|row| row.make_mode_counter)
        else {
            return false;
        };
        self.update_make_mode_counter(id, counter.saturating_add(1)).await
    }

    pub async fn decrement_make_mode_counter(&mut self, id: &str) -> bool {
        let Some(counter) = self
            .local_row(id, "make mode counter")
            .map(|row| row.make_mode_counter)
        else {
            return false;
        };
        if counter <= 0 {
            return true;
        }
        self.update_make_mode_counter(id, counter - 1).await
    }

    pub async fn update_instructions(&mut self, id: &str, instructions: &str) -> bool {
        let patch = RowPatch {
            instructions: Some(instructions.to_string()),
            ..Default::default()
        };
        self.update_field(id, patch, "instructions").await
    }

    pub async fn update_label(&mut self, id: &str, label: &str) -> bool {
        let patch = RowPatch {
            label: Some(label.to_string()),
            ..Default::default()
        };
        self.update_field(id, patch, "label").await
    }

    pub async fn update_total_stitches(&mut self, id: &str, total_stitches: &str) -> bool {
        let patch = RowPatch {
            total_stitches: Some(total_stitches.to_string()),
            ..Default::default()
        };
        self.update_field(id, patch, "total stitches").await
    }

    pub async fn set_image_url(&mut self, id: &str, image_url: Option<String>) -> bool {
        let patch = RowPatch {
            image_url: Some(image_url),
            ..Default::default()
        };
        self.update_field(id, patch, "image").await
    }

    /// Flips the edit lock. The lock only affects presentation.
    pub async fn toggle_lock(&mut self, id: &str) -> bool {
        let Some(locked) = self.local_row(id, "lock").map(|row| row.is_locked) else {
            return false;
        };
        let patch = RowPatch {
            is_locked: Some(!locked),
            ..Default::default()
        };
        self.update_field(id, patch, "lock").await
    }

    /// Inserts a blank entry after position `after`, or at the end. Returns the new id.
    pub async fn add_row_of(&mut self, after: Option<i32>, row_type: RowType) -> Option<String> {
        let (noun, failure) = match row_type {
            RowType::Row => ("Row", "Failed to add row"),
            RowType::Note => ("Note", "Failed to add note"),
            RowType::Divider => ("Divider", "Failed to add divider"),
        };

        let inserted = match self.service.insert_row(self.project_id, after, row_type).await {
            Ok(row) => {
                self.notifier.success(format!("{} added", noun));
                Some(row.id)
            }
            Err(e) => {
                self.report(failure, &e);
                None
            }
        };
        self.load().await;
        inserted
    }

    pub async fn add_row(&mut self, after: Option<i32>) -> Option<String> {
        self.add_row_of(after, RowType::Row).await
    }

    pub async fn add_note(&mut self, after: Option<i32>) -> Option<String> {
        self.add_row_of(after, RowType::Note).await
    }

    pub async fn add_divider(&mut self, after: Option<i32>) -> Option<String> {
        self.add_row_of(after, RowType::Divider).await
    }

    pub async fn duplicate_row(&mut self, id: &str) -> Option<String> {
        let duplicated = match self.service.duplicate_row(id).await {
            Ok(row) => {
                self.notifier.success("Row duplicated");
                Some(row.id)
            }
            Err(e) => {
                self.report("Failed to duplicate row", &e);
                None
            }
        };
        self.load().await;
        duplicated
    }

    pub async fn delete_row(&mut self, id: &str) -> bool {
        let deleted = match self.service.delete_row(id).await {
            Ok(_) => {
                self.notifier.success("Row deleted");
                true
            }
            Err(e) => {
                self.report("Failed to delete row", &e);
                false
            }
        };
        self.load().await;
        deleted
    }
}
