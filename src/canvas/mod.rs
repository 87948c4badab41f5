//! Planner board: positioned elements, the pan/zoom view, selection and auto-save.

pub mod autosave;
pub mod elements;
pub mod selection;
pub mod viewport;

use serde::{Deserialize, Serialize};

pub use autosave::{AutoSaveConfig, AutoSaver, SaveState, SaveStatus};
pub use selection::SelectionController;
pub use viewport::{Modifiers, PanZoomController, PointerButton, PointerTarget, WheelOutcome};

/// Point in screen pixels or board coordinates, depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Active board tool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Move,
    Text,
    Image,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Move => "move",
            Tool::Text => "text",
            Tool::Image => "image",
        }
    }
}

/// Element placed on a plan's board.
///
/// `is_editing` is UI state only; it is never serialised, so it neither
/// reaches the store nor counts as a change for auto-save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub content: String,
    #[serde(skip)]
    pub is_editing: bool,
}

impl CanvasElement {
    pub fn new(element_type: impl Into<String>, content: impl Into<String>, at: Point) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            x: at.x,
            y: at.y,
            element_type: element_type.into(),
            content: content.into(),
            is_editing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_flag_not_serialised() {
        let mut element = CanvasElement::new("text", "Granny square", Point::new(10.0, 20.0));
        let before = serde_json::to_string(&element).unwrap();
        element.is_editing = true;
        let after = serde_json::to_string(&element).unwrap();

        assert_eq!(before, after);
        assert!(after.contains("\"type\":\"text\""));
        assert!(!after.contains("is_editing"));
    }

    #[test]
    fn test_deserialise_defaults_editing_off() {
        let json = r#"[{"id":"e1","x":1.5,"y":2.0,"type":"image","content":"https://img/yarn.png"}]"#;
        let elements: Vec<CanvasElement> = serde_json::from_str(json).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].element_type, "image");
        assert!(!elements[0].is_editing);
    }
}
