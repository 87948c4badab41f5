//! Local edits to a board's element collection.
//!
//! These only touch the in-memory collection; persistence happens when the
//! auto-saver observes the changed collection.

use super::{CanvasElement, Point};
use crate::errors::{CanvasError, CanvasResult};

/// Appends a new element and returns its id.
pub fn add_element(
    elements: &mut Vec<CanvasElement>,
    element_type: &str,
    content: &str,
    at: Point,
) -> String {
    let element = CanvasElement::new(element_type, content, at);
    let id = element.id.clone();
    elements.push(element);
    id
}

fn find_mut<'a>(elements: &'a mut [CanvasElement], id: &str) -> CanvasResult<&'a mut CanvasElement> {
    elements
        .iter_mut()
        .find(|element| element.id == id)
        .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))
}

pub fn move_element(elements: &mut [CanvasElement], id: &str, to: Point) -> CanvasResult<()> {
    let element = find_mut(elements, id)?;
    element.x = to.x;
    element.y = to.y;
    Ok(())
}

pub fn update_content(elements: &mut [CanvasElement], id: &str, content: &str) -> CanvasResult<()> {
    find_mut(elements, id)?.content = content.to_string();
    Ok(())
}

pub fn set_editing(elements: &mut [CanvasElement], id: &str, editing: bool) -> CanvasResult<()> {
    find_mut(elements, id)?.is_editing = editing;
    Ok(())
}

/// Removes an element, keeping the order of the rest.
pub fn remove_element(elements: &mut Vec<CanvasElement>, id: &str) -> CanvasResult<CanvasElement> {
    let index = elements
        .iter()
        .position(|element| element.id == id)
        .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
    Ok(elements.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_move_and_remove_preserve_order() {
        let mut elements = Vec::new();
        let a = add_element(&mut elements, "text", "Border ideas", Point::new(0.0, 0.0));
        let b = add_element(&mut elements, "image", "https://img/b.png", Point::new(5.0, 5.0));
        let c = add_element(&mut elements, "text", "Colourway", Point::new(9.0, 9.0));

        move_element(&mut elements, &b, Point::new(42.0, -3.0)).unwrap();
        assert_eq!((elements[1].x, elements[1].y), (42.0, -3.0));

        let removed = remove_element(&mut elements, &b).unwrap();
        assert_eq!(removed.content, "https://img/b.png");
        let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), c.as_str()]);
    }

    #[test]
    fn test_unknown_element() {
        let mut elements = Vec::new();
        let err = update_content(&mut elements, "missing", "x").unwrap_err();
        assert!(err.is_not_found());
        assert!(remove_element(&mut elements, "missing").is_err());
    }

    #[test]
    fn test_set_editing() {
        let mut elements = Vec::new();
        let id = add_element(&mut elements, "text", "", Point::default());
        set_editing(&mut elements, &id, true).unwrap();
        assert!(elements[0].is_editing);
    }
}
