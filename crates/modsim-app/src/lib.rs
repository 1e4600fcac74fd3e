//! ModSim Application
//!
//! The native shell: a winit window with a Vello surface driving the
//! viewport, plus a demo circuit and a stand-in simulation thread.

mod app;
pub mod demo;

pub use app::{App, AppConfig, AppError};
