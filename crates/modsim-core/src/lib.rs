//! ModSim Core Library
//!
//! Platform-agnostic view state and collaborator traits for the ModSim viewport.

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod scene;
pub mod snap;
pub mod surface;
pub mod tools;

pub use camera::Camera;
pub use config::{SerializableColor, Theme, ViewConfig, ZOOM_LIMIT, ZOOM_MULTIPLIER};
pub use error::{ConfigError, CoreError, CoreResult};
pub use input::{KeyEvent, MouseButton, PointerEvent};
pub use scene::{Link, LinkId, Module, ModuleId, SceneHandle, Simulation};
pub use snap::{snap_to_grid, SnapResult};
pub use surface::{DrawCommand, RecordingSurface, Surface, TextStyle};
pub use tools::{PlaceTool, Tool, ToolInput, ToolInputKind, ToolSession, ToolStatus};
