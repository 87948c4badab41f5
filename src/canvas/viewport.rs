//! Pan/zoom view transform for the planner board.
//!
//! The transform never touches element coordinates: a board point `b` is
//! drawn at `b * zoom + pan` in screen space.

use super::{Point, Tool};

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_IN_FACTOR: f64 = 1.03;
pub const ZOOM_OUT_FACTOR: f64 = 0.97;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// What the pointer went down on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    /// The board background itself
    Board,
    /// A child element, by id
    Element(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelOutcome {
    /// The event changed the zoom and should not scroll the page.
    Zoomed,
    /// Not ours; let the page scroll natively.
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanZoomController {
    pan: Point,
    zoom: f64,
    /// Pointer position minus pan, captured at pointer-down
    drag_origin: Option<Point>,
}

impl Default for PanZoomController {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
            drag_origin: None,
        }
    }
}

impl PanZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn is_panning(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Starts a pan when the primary button goes down on the bare board with
    /// the move tool active. Returns whether panning started.
    pub fn on_pointer_down(
        &mut self,
        button: PointerButton,
        target: &PointerTarget,
        position: Point,
        tool: Tool,
    ) -> bool {
        if button != PointerButton::Primary || *target != PointerTarget::Board || tool != Tool::Move
        {
            return false;
        }

        self.drag_origin = Some(Point::new(position.x - self.pan.x, position.y - self.pan.y));
        true
    }

    /// Returns whether the pan offset changed.
    pub fn on_pointer_move(&mut self, position: Point) -> bool {
        let Some(origin) = self.drag_origin else {
            return false;
        };
        self.pan = Point::new(position.x - origin.x, position.y - origin.y);
        true
    }

    /// Pointer released anywhere in the window.
    pub fn on_pointer_up(&mut self) {
        self.drag_origin = None;
    }

    /// Zooms around `position` when ctrl or meta is held.
    ///
    /// Negative `delta_y` (scroll up) zooms in. The board point under the
    /// pointer stays under the pointer.
    pub fn on_wheel(&mut self, delta_y: f64, position: Point, modifiers: Modifiers) -> WheelOutcome {
        if !(modifiers.ctrl || modifiers.meta) || delta_y == 0.0 {
            return WheelOutcome::Ignored;
        }

        let factor = if delta_y < 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new_zoom / self.zoom;

        self.pan = Point::new(
            position.x - (position.x - self.pan.x) * ratio,
            position.y - (position.y - self.pan.y) * ratio,
        );
        self.zoom = new_zoom;

        WheelOutcome::Zoomed
    }

    pub fn screen_to_board(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn board_to_screen(&self, board: Point) -> Point {
        Point::new(
            board.x * self.zoom + self.pan.x,
            board.y * self.zoom + self.pan.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
    };

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_pan_only_from_board_with_move_tool() {
        let mut view = PanZoomController::new();

        assert!(!view.on_pointer_down(
            PointerButton::Primary,
            &PointerTarget::Element("e1".to_string()),
            Point::new(10.0, 10.0),
            Tool::Move
        ));
        assert!(!view.on_pointer_down(
            PointerButton::Secondary,
            &PointerTarget::Board,
            Point::new(10.0, 10.0),
            Tool::Move
        ));
        assert!(!view.on_pointer_down(
            PointerButton::Primary,
            &PointerTarget::Board,
            Point::new(10.0, 10.0),
            Tool::Text
        ));
        assert!(!view.on_pointer_move(Point::new(50.0, 50.0)));
        assert_eq!(view.pan(), Point::default());

        assert!(view.on_pointer_down(
            PointerButton::Primary,
            &PointerTarget::Board,
            Point::new(10.0, 10.0),
            Tool::Move
        ));
        assert!(view.on_pointer_move(Point::new(40.0, 25.0)));
        assert_eq!(view.pan(), Point::new(30.0, 15.0));

        view.on_pointer_up();
        assert!(!view.is_panning());
        assert!(!view.on_pointer_move(Point::new(400.0, 400.0)));
        assert_eq!(view.pan(), Point::new(30.0, 15.0));

        // A second drag continues from the current offset
        view.on_pointer_down(
            PointerButton::Primary,
            &PointerTarget::Board,
            Point::new(0.0, 0.0),
            Tool::Move,
        );
        view.on_pointer_move(Point::new(-5.0, 5.0));
        assert_eq!(view.pan(), Point::new(25.0, 20.0));
    }

    #[test]
    fn test_plain_wheel_is_ignored() {
        let mut view = PanZoomController::new();
        let outcome = view.on_wheel(-120.0, Point::new(5.0, 5.0), Modifiers::default());
        assert_eq!(outcome, WheelOutcome::Ignored);
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_zoom_steps() {
        let mut view = PanZoomController::new();
        view.on_wheel(-1.0, Point::default(), CTRL);
        assert!((view.zoom() - 1.03).abs() < 1e-12);

        let mut view = PanZoomController::new();
        let meta = Modifiers {
            ctrl: false,
            meta: true,
        };
        assert_eq!(view.on_wheel(1.0, Point::default(), meta), WheelOutcome::Zoomed);
        assert!((view.zoom() - 0.97).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        let cursors = [
            Point::new(0.0, 0.0),
            Point::new(320.5, 180.25),
            Point::new(-40.0, 900.0),
        ];

        for cursor in cursors {
            for delta in [-1.0, 1.0] {
                let mut view = PanZoomController::new();
                view.on_pointer_down(
                    PointerButton::Primary,
                    &PointerTarget::Board,
                    Point::new(0.0, 0.0),
                    Tool::Move,
                );
                view.on_pointer_move(Point::new(37.0, -12.0));
                view.on_pointer_up();
                for _ in 0..5 {
                    view.on_wheel(-1.0, cursor, CTRL);
                }

                let anchored = view.screen_to_board(cursor);
                view.on_wheel(delta, cursor, CTRL);
                assert_close(view.board_to_screen(anchored), cursor);
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = PanZoomController::new();
        let cursor = Point::new(100.0, 100.0);
        for _ in 0..500 {
            view.on_wheel(-1.0, cursor, CTRL);
            assert!(view.zoom() <= MAX_ZOOM);
        }
        assert_eq!(view.zoom(), MAX_ZOOM);

        // Anchoring still holds when the step is clamped
        let anchored = view.screen_to_board(Point::new(7.0, 3.0));
        view.on_wheel(-1.0, Point::new(7.0, 3.0), CTRL);
        assert_close(view.board_to_screen(anchored), Point::new(7.0, 3.0));

        for _ in 0..500 {
            view.on_wheel(1.0, cursor, CTRL);
            assert!(view.zoom() >= MIN_ZOOM);
        }
        assert_eq!(view.zoom(), MIN_ZOOM);
    }
}
