//! Make mode progression rules.
//!
//! Everything here is pure: functions take the current row set (ordered by
//! position) and return the row updates to persist. The service layer issues
//! those updates one by one and then reloads the project.

use serde::Serialize;

use super::{MakeModeStatus, ProjectRow, RowPatch, ViewMode};
use crate::errors::{RowError, RowResult};

/// A single pending row write.
pub type RowUpdate = (String, RowPatch);

/// What a requested status change turns into.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusPlan {
    /// Persist these updates in order.
    Apply(Vec<RowUpdate>),
    /// Un-completing a row wipes the progress after it; ask the user first.
    NeedsConfirmation,
    /// The row already has the requested status.
    Unchanged,
}

/// Rows visible in the current view plus the bookkeeping the UI shows around them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayView {
    pub rows: Vec<ProjectRow>,
    /// Index of the in-progress row within `rows`.
    pub in_progress_index: Option<usize>,
    pub hidden_count: usize,
    pub has_completed: bool,
}

pub fn has_in_progress(rows: &[ProjectRow]) -> bool {
    rows.iter()
        .any(|row| row.is_trackable() && row.make_mode_status == MakeModeStatus::InProgress)
}

/// First row or note by position.
pub fn first_trackable(rows: &[ProjectRow]) -> Option<&ProjectRow> {
    rows.iter()
        .filter(|row| row.is_trackable())
        .min_by_key(|row| row.position)
}

/// Next row or note strictly after `position`.
pub fn next_trackable_after(rows: &[ProjectRow], position: i32) -> Option<&ProjectRow> {
    rows.iter()
        .filter(|row| row.is_trackable() && row.position > position)
        .min_by_key(|row| row.position)
}

/// Rows and notes strictly after `position`, in position order.
pub fn rows_after(rows: &[ProjectRow], position: i32) -> Vec<&ProjectRow> {
    let mut after: Vec<&ProjectRow> = rows
        .iter()
        .filter(|row| row.is_trackable() && row.position > position)
        .collect();
    after.sort_by_key(|row| row.position);
    after
}

/// Row the load-time rule should promote to in progress, if any.
///
/// Nothing is promoted while a cursor exists, when the project has no rows or
/// notes, or once every row and note is complete.
pub fn cursor_to_restore(rows: &[ProjectRow]) -> Option<&ProjectRow> {
    if has_in_progress(rows) {
        return None;
    }

    rows.iter()
        .filter(|row| row.is_trackable() && row.make_mode_status != MakeModeStatus::Complete)
        .min_by_key(|row| row.position)
}

/// Decides which writes a status change on `id` needs.
pub fn plan_status_change(
    rows: &[ProjectRow],
    id: &str,
    status: MakeModeStatus,
) -> RowResult<StatusPlan> {
    let target = rows
        .iter()
        .find(|row| row.id == id)
        .ok_or_else(|| RowError::NotFound(id.to_string()))?;

    if !target.is_trackable() {
        return Err(RowError::DividerNotTrackable(id.to_string()));
    }

    let current = target.make_mode_status;
    if current == status {
        return Ok(StatusPlan::Unchanged);
    }

    match (current, status) {
        (MakeModeStatus::InProgress, MakeModeStatus::Complete) => {
            Ok(StatusPlan::Apply(completion_updates(rows, target)))
        }
        (MakeModeStatus::NotStarted, MakeModeStatus::Complete) => Err(RowError::Validation(
            "Only the row in progress can be completed".to_string(),
        )),
        (MakeModeStatus::Complete, MakeModeStatus::InProgress) => Ok(StatusPlan::NeedsConfirmation),
        (MakeModeStatus::Complete, MakeModeStatus::NotStarted) => Ok(StatusPlan::Apply(vec![(
            target.id.clone(),
            RowPatch::reset_to(MakeModeStatus::NotStarted),
        )])),
        (_, MakeModeStatus::InProgress) => {
            // Moving the cursor: the previous in-progress row steps back.
            let mut updates: Vec<RowUpdate> = rows
                .iter()
                .filter(|row| {
                    row.id != target.id && row.make_mode_status == MakeModeStatus::InProgress
                })
                .map(|row| (row.id.clone(), RowPatch::status(MakeModeStatus::NotStarted)))
                .collect();
            updates.push((target.id.clone(), RowPatch::status(MakeModeStatus::InProgress)));
            Ok(StatusPlan::Apply(updates))
        }
        (_, status) => Ok(StatusPlan::Apply(vec![(
            target.id.clone(),
            RowPatch::status(status),
        )])),
    }
}

/// Completes `target` and hands the cursor to the next row or note.
fn completion_updates(rows: &[ProjectRow], target: &ProjectRow) -> Vec<RowUpdate> {
    let mut updates = vec![(target.id.clone(), RowPatch::status(MakeModeStatus::Complete))];

    if let Some(next) = next_trackable_after(rows, target.position) {
        let patch = if next.make_mode_status == MakeModeStatus::Complete {
            RowPatch::reset_to(MakeModeStatus::InProgress)
        } else {
            RowPatch::status(MakeModeStatus::InProgress)
        };
        updates.push((next.id.clone(), patch));
    }

    updates
}

/// Writes for a confirmed un-complete of `id`: the row becomes the cursor
/// again, any cursor before it steps back to not started, and every row or
/// note after it loses its progress.
pub fn uncomplete_updates(rows: &[ProjectRow], id: &str) -> RowResult<Vec<RowUpdate>> {
    let target = rows
        .iter()
        .find(|row| row.id == id)
        .ok_or_else(|| RowError::NotFound(id.to_string()))?;

    if !target.is_trackable() {
        return Err(RowError::DividerNotTrackable(id.to_string()));
    }

    // A cursor sitting before the target steps back so only one remains.
    let mut updates: Vec<RowUpdate> = rows
        .iter()
        .filter(|row| {
            row.is_trackable()
                && row.id != target.id
                && row.position < target.position
                && row.make_mode_status == MakeModeStatus::InProgress
        })
        .map(|row| (row.id.clone(), RowPatch::status(MakeModeStatus::NotStarted)))
        .collect();
    updates.push((
        target.id.clone(),
        RowPatch::reset_to(MakeModeStatus::InProgress),
    ));
    updates.extend(
        rows_after(rows, target.position)
            .into_iter()
            .map(|row| (row.id.clone(), RowPatch::reset_to(MakeModeStatus::NotStarted))),
    );

    Ok(updates)
}

/// Moves the row at `from` to `to` and renumbers positions densely from 1.
pub fn reorder(rows: &[ProjectRow], from: usize, to: usize) -> RowResult<Vec<ProjectRow>> {
    let len = rows.len();
    for index in [from, to] {
        if index >= len {
            return Err(RowError::IndexOutOfRange { index, len });
        }
    }

    let mut working: Vec<ProjectRow> = rows.to_vec();
    working.sort_by_key(|row| row.position);
    let moved = working.remove(from);
    working.insert(to, moved);

    for (index, row) in working.iter_mut().enumerate() {
        row.position = index as i32 + 1;
    }

    Ok(working)
}

/// Writes that wipe make mode progress after a reorder: everything back to
/// not started, then the first row or note becomes the cursor.
pub fn progress_reset_updates(rows: &[ProjectRow]) -> Vec<RowUpdate> {
    let mut updates: Vec<RowUpdate> = rows
        .iter()
        .map(|row| (row.id.clone(), RowPatch::reset_to(MakeModeStatus::NotStarted)))
        .collect();

    if let Some(first) = first_trackable(rows) {
        updates.push((first.id.clone(), RowPatch::status(MakeModeStatus::InProgress)));
    }

    updates
}

/// Builds the visible row set for a view.
///
/// Completed rows are hidden only in make mode with `hide_completed` set;
/// edit mode always shows every row.
pub fn filter_for_display(rows: &[ProjectRow], hide_completed: bool, mode: ViewMode) -> DisplayView {
    let has_completed = rows
        .iter()
        .any(|row| row.make_mode_status == MakeModeStatus::Complete);

    let visible: Vec<ProjectRow> = if mode == ViewMode::Make && hide_completed {
        rows.iter()
            .filter(|row| row.make_mode_status != MakeModeStatus::Complete)
            .cloned()
            .collect()
    } else {
        rows.to_vec()
    };

    let hidden_count = rows.len() - visible.len();
    let in_progress_index = visible.iter().position(|row| {
        row.is_trackable() && row.make_mode_status == MakeModeStatus::InProgress
    });

    DisplayView {
        rows: visible,
        in_progress_index,
        hidden_count,
        has_completed,
    }
}

/// Position a new row takes when inserted after `anchor` (or appended).
pub fn insert_position(rows: &[ProjectRow], anchor: Option<i32>) -> i32 {
    let last = rows.iter().map(|row| row.position).max().unwrap_or(0);
    match anchor {
        Some(anchor) if anchor < last => anchor.max(0) + 1,
        _ => last + 1,
    }
}
