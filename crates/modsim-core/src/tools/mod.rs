//! Tool system for the viewport.
//!
//! A tool is a transient interaction mode (placing a module, dragging a
//! wire) that can draw previews in world and screen space. At most one tool
//! is active; [`ToolSession`] owns it and makes sure a tool being replaced or
//! dismissed gets a chance to release its in-progress state.

mod place;

pub use place::{ModuleFactory, PlaceTool};

use crate::input::MouseButton;
use crate::scene::Simulation;
use crate::surface::Surface;
use kurbo::Point;
use std::fmt;

/// What happened in an input event routed to a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInputKind {
    Press(MouseButton),
    Release(MouseButton),
    Move,
    Key(String),
}

/// Input event routed to the active tool, in both coordinate systems.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInput {
    pub kind: ToolInputKind,
    /// Pointer position in screen pixels.
    pub screen: Point,
    /// Pointer position in world coordinates.
    pub world: Point,
}

/// Response of a tool to an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolStatus {
    /// The tool did not use the event.
    #[default]
    Ignored,
    /// The tool used the event and stays active.
    Continue,
    /// The tool completed its work and should be dropped without cancelling.
    Finished,
}

/// An interactive tool.
pub trait Tool: Send {
    /// Name for logs and UI.
    fn name(&self) -> &str;

    /// Draw world-anchored previews. The surface carries the world transform.
    fn paint_world(&self, surface: &mut dyn Surface);

    /// Draw fixed-position overlays. The surface carries the screen transform.
    fn paint_screen(&self, _surface: &mut dyn Surface) {}

    /// Abort any partial operation and release in-progress state.
    fn cancel(&mut self);

    /// React to pointer or key input. Called with the scene locked.
    fn handle_input(&mut self, _input: &ToolInput, _scene: &mut Simulation) -> ToolStatus {
        ToolStatus::Ignored
    }
}

/// Owns the single active tool.
#[derive(Default)]
pub struct ToolSession {
    current: Option<Box<dyn Tool>>,
}

impl fmt::Debug for ToolSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSession")
            .field("current", &self.current.as_ref().map(|tool| tool.name()))
            .finish()
    }
}

impl ToolSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a tool, cancelling the one it replaces.
    pub fn set_tool(&mut self, tool: Box<dyn Tool>) {
        self.cancel_tool();
        log::debug!("Tool activated: {}", tool.name());
        self.current = Some(tool);
    }

    /// Cancel and drop the active tool. Returns `false` when idle.
    pub fn cancel_tool(&mut self) -> bool {
        match self.current.take() {
            Some(mut tool) => {
                log::debug!("Tool cancelled: {}", tool.name());
                tool.cancel();
                true
            }
            None => false,
        }
    }

    /// Check if a tool is active.
    pub fn has_tool(&self) -> bool {
        self.current.is_some()
    }

    pub fn tool(&self) -> Option<&dyn Tool> {
        self.current.as_deref()
    }

    /// Route input to the active tool. A tool reporting
    /// [`ToolStatus::Finished`] is dropped without being cancelled.
    pub fn dispatch(&mut self, input: &ToolInput, scene: &mut Simulation) -> ToolStatus {
        let Some(tool) = self.current.as_mut() else {
            return ToolStatus::Ignored;
        };
        let status = tool.handle_input(input, scene);
        if status == ToolStatus::Finished {
            log::debug!("Tool finished: {}", tool.name());
            self.current = None;
        }
        status
    }
}
