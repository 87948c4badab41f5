//! Project row model shared by the store, the progression rules and the row engine.

pub mod progression;

use serde::{Deserialize, Serialize};

use crate::database::entities::project_rows;
use crate::errors::RowError;

pub use progression::DisplayView;

/// Kind of content a row carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowType {
    Row,
    Note,
    Divider,
}

impl RowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowType::Row => "row",
            RowType::Note => "note",
            RowType::Divider => "divider",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "row" => Some(RowType::Row),
            "note" => Some(RowType::Note),
            "divider" => Some(RowType::Divider),
            _ => None,
        }
    }

    /// Rows and notes carry make mode progress; dividers never do.
    pub fn is_trackable(&self) -> bool {
        !matches!(self, RowType::Divider)
    }
}

/// Make mode progress of a single row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MakeModeStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl MakeModeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MakeModeStatus::NotStarted => "not_started",
            MakeModeStatus::InProgress => "in_progress",
            MakeModeStatus::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(MakeModeStatus::NotStarted),
            "in_progress" => Some(MakeModeStatus::InProgress),
            "complete" => Some(MakeModeStatus::Complete),
            _ => None,
        }
    }
}

/// Which view the rows are being shown in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Edit,
    Make,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub project_id: i32,
    pub row_type: RowType,
    pub position: i32,
    pub counter: i32,
    pub instructions: String,
    pub label: String,
    pub total_stitches: String,
    pub is_locked: bool,
    pub make_mode_status: MakeModeStatus,
    pub make_mode_counter: i32,
    pub image_url: Option<String>,
}

impl ProjectRow {
    pub fn is_trackable(&self) -> bool {
        self.row_type.is_trackable()
    }

    /// Applies the fields set in `patch` to this row in place.
    pub fn apply(&mut self, patch: &RowPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(counter) = patch.counter {
            self.counter = counter;
        }
        if let Some(instructions) = &patch.instructions {
            self.instructions = instructions.clone();
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(total_stitches) = &patch.total_stitches {
            self.total_stitches = total_stitches.clone();
        }
        if let Some(is_locked) = patch.is_locked {
            self.is_locked = is_locked;
        }
        if let Some(status) = patch.make_mode_status {
            self.make_mode_status = status;
        }
        if let Some(counter) = patch.make_mode_counter {
            self.make_mode_counter = counter;
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
    }
}

impl TryFrom<project_rows::Model> for ProjectRow {
    type Error = RowError;

    fn try_from(model: project_rows::Model) -> Result<Self, Self::Error> {
        let row_type =
            RowType::from_str(&model.row_type).ok_or_else(|| RowError::InvalidStoredValue {
                field: "type",
                value: model.row_type.clone(),
            })?;
        let make_mode_status = MakeModeStatus::from_str(&model.make_mode_status).ok_or_else(
            || RowError::InvalidStoredValue {
                field: "make_mode_status",
                value: model.make_mode_status.clone(),
            },
        )?;

        Ok(Self {
            id: model.id,
            project_id: model.project_id,
            row_type,
            position: model.position,
            counter: model.counter,
            instructions: model.instructions,
            label: model.label,
            total_stitches: model.total_stitches,
            is_locked: model.is_locked,
            make_mode_status,
            make_mode_counter: model.make_mode_counter,
            image_url: model.image_url,
        })
    }
}

/// Values for a row about to be inserted; the store assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRow {
    pub project_id: i32,
    pub row_type: RowType,
    pub position: i32,
    pub counter: i32,
    pub instructions: String,
    pub label: String,
    pub total_stitches: String,
    pub image_url: Option<String>,
}

impl NewRow {
    pub fn blank(project_id: i32, row_type: RowType, position: i32) -> Self {
        Self {
            project_id,
            row_type,
            position,
            counter: 0,
            instructions: String::new(),
            label: String::new(),
            total_stitches: String::new(),
            image_url: None,
        }
    }

    /// Copy of `source`'s authored content placed at `position`.
    pub fn copy_of(source: &ProjectRow, position: i32) -> Self {
        Self {
            project_id: source.project_id,
            row_type: source.row_type,
            position,
            counter: source.counter,
            instructions: source.instructions.clone(),
            label: source.label.clone(),
            total_stitches: source.total_stitches.clone(),
            image_url: source.image_url.clone(),
        }
    }
}

/// Partial row update. Only `Some` fields are written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowPatch {
    pub position: Option<i32>,
    pub counter: Option<i32>,
    pub instructions: Option<String>,
    pub label: Option<String>,
    pub total_stitches: Option<String>,
    pub is_locked: Option<bool>,
    pub make_mode_status: Option<MakeModeStatus>,
    pub make_mode_counter: Option<i32>,
    pub image_url: Option<Option<String>>,
}

impl RowPatch {
    pub fn position(position: i32) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn status(status: MakeModeStatus) -> Self {
        Self {
            make_mode_status: Some(status),
            ..Default::default()
        }
    }

    /// Status change that also zeroes the live make mode counter.
    pub fn reset_to(status: MakeModeStatus) -> Self {
        Self {
            make_mode_status: Some(status),
            make_mode_counter: Some(0),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == RowPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(MakeModeStatus::InProgress.as_str(), "in_progress");
        assert_eq!(
            MakeModeStatus::from_str("complete"),
            Some(MakeModeStatus::Complete)
        );
        assert_eq!(MakeModeStatus::from_str("done"), None);
    }

    #[test]
    fn test_row_type_trackable() {
        assert!(RowType::Row.is_trackable());
        assert!(RowType::Note.is_trackable());
        assert!(!RowType::Divider.is_trackable());
        assert_eq!(RowType::from_str("divider"), Some(RowType::Divider));
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let mut row = ProjectRow {
            id: "r1".to_string(),
            project_id: 1,
            row_type: RowType::Row,
            position: 1,
            counter: 4,
            instructions: "sc 6".to_string(),
            label: "Round 1".to_string(),
            total_stitches: "6".to_string(),
            is_locked: false,
            make_mode_status: MakeModeStatus::Complete,
            make_mode_counter: 6,
            image_url: Some("https://img/1.png".to_string()),
        };

        row.apply(&RowPatch::reset_to(MakeModeStatus::InProgress));
        assert_eq!(row.make_mode_status, MakeModeStatus::InProgress);
        assert_eq!(row.make_mode_counter, 0);
        assert_eq!(row.counter, 4);
        assert_eq!(row.instructions, "sc 6");

        row.apply(&RowPatch {
            image_url: Some(None),
            ..Default::default()
        });
        assert_eq!(row.image_url, None);
    }

    #[test]
    fn test_empty_patch() {
        assert!(RowPatch::default().is_empty());
        assert!(!RowPatch::position(2).is_empty());
    }
}
