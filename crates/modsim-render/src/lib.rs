//! ModSim Render Library
//!
//! The simulator viewport and its drawing backends.
//! The default backend encodes frames into a Vello scene.

mod renderer;
mod viewport;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{
    draw_error_marker, draw_status, format_rate, status_line, FrameStats, GridLayout,
    RenderResult, RendererError, MIN_GRID_SPACING,
};
pub use viewport::Viewport;

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloSurface;
