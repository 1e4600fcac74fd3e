//! Input event types delivered by the windowing layer.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// Wheel or trackpad scroll. Negative `delta.y` scrolls up.
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

impl PointerEvent {
    /// Screen position the event happened at.
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Scroll { position, .. } => *position,
        }
    }
}

/// Keyboard event type. Keys are named the way winit names them
/// (`"Escape"`, `"a"`, `"+"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Tracks an in-progress drag used for panning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    button: Option<MouseButton>,
    last: Point,
}

impl DragState {
    /// Start tracking a drag with `button` at `position`.
    pub fn begin(&mut self, button: MouseButton, position: Point) {
        self.button = Some(button);
        self.last = position;
    }

    /// Advance the drag, returning the screen delta since the last call.
    pub fn update(&mut self, position: Point) -> Option<Vec2> {
        self.button?;
        let delta = position - self.last;
        self.last = position;
        Some(delta)
    }

    /// Stop the drag if `button` is the one that started it.
    pub fn end(&mut self, button: MouseButton) -> bool {
        if self.button == Some(button) {
            self.button = None;
            true
        } else {
            false
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.button.is_some()
    }
}
