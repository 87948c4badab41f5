use super::Tool;

/// Single-element selection, only honoured while the move tool is active.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionController {
    tool: Tool,
    selected: Option<String>,
}

impl SelectionController {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            selected: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Any tool change drops the selection, even re-picking the same tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.selected = None;
    }

    /// Returns whether the selection was taken.
    pub fn select(&mut self, id: &str) -> bool {
        if self.tool != Tool::Move {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_requires_move_tool() {
        let mut selection = SelectionController::new(Tool::Text);
        assert!(!selection.select("e1"));
        assert_eq!(selection.selected(), None);

        selection.set_tool(Tool::Move);
        assert!(selection.select("e1"));
        assert_eq!(selection.selected(), Some("e1"));

        assert!(selection.select("e2"));
        assert_eq!(selection.selected(), Some("e2"));
    }

    #[test]
    fn test_tool_change_and_deselect_clear() {
        let mut selection = SelectionController::default();
        selection.select("e1");
        selection.set_tool(Tool::Move);
        assert_eq!(selection.selected(), None);

        selection.select("e1");
        selection.deselect();
        assert_eq!(selection.selected(), None);
    }
}
