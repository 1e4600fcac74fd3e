//! View configuration loaded from JSON.

use crate::error::ConfigError;
use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Scale contributed by each zoom step.
pub const ZOOM_MULTIPLIER: f64 = 0.2;
/// Highest zoom index.
pub const ZOOM_LIMIT: u32 = 12;
/// Zoom index a fresh view starts at.
pub const DEFAULT_ZOOM_INDEX: u32 = 3;
/// Character width the iteration rate is right-aligned to.
pub const STATUS_WIDTH: usize = 20;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Colors used by the viewport itself (modules and links bring their own).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: SerializableColor,
    pub grid: SerializableColor,
    pub error_edge: SerializableColor,
    pub error_fill: SerializableColor,
    pub error_text: SerializableColor,
    pub status_text: SerializableColor,
    pub tool_preview: SerializableColor,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: SerializableColor::rgb(255, 255, 255),
            grid: SerializableColor::rgb(225, 230, 235),
            error_edge: SerializableColor::rgb(160, 20, 20),
            error_fill: SerializableColor::new(255, 90, 90, 200),
            error_text: SerializableColor::rgb(255, 255, 255),
            status_text: SerializableColor::rgb(0, 0, 0),
            tool_preview: SerializableColor::new(59, 130, 246, 160),
        }
    }
}

/// Viewport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Scale added per zoom index.
    pub zoom_multiplier: f64,
    /// Inclusive upper bound of the zoom index (lower bound is 1).
    pub zoom_limit: u32,
    /// Zoom index used on startup and after a reset.
    pub initial_zoom_index: u32,
    /// Whether frames start antialiased.
    pub antialias: bool,
    /// Width the iteration rate is padded to.
    pub status_width: usize,
    /// Screen-space baseline origin of the status line.
    pub status_origin: Point,
    /// Font size of the status line, in pixels.
    pub status_font_size: f64,
    pub theme: Theme,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_multiplier: ZOOM_MULTIPLIER,
            zoom_limit: ZOOM_LIMIT,
            initial_zoom_index: DEFAULT_ZOOM_INDEX,
            antialias: true,
            status_width: STATUS_WIDTH,
            status_origin: Point::new(10.0, 10.0),
            status_font_size: 10.0,
            theme: Theme::default(),
        }
    }
}

impl ViewConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded view configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the zoom range and status settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zoom_multiplier.is_finite() || self.zoom_multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom_multiplier must be positive, got {}",
                self.zoom_multiplier
            )));
        }
        if self.zoom_limit < 1 {
            return Err(ConfigError::Invalid("zoom_limit must be at least 1".to_string()));
        }
        if !(1..=self.zoom_limit).contains(&self.initial_zoom_index) {
            return Err(ConfigError::Invalid(format!(
                "initial_zoom_index {} outside 1..={}",
                self.initial_zoom_index, self.zoom_limit
            )));
        }
        if !self.status_font_size.is_finite() || self.status_font_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "status_font_size must be positive, got {}",
                self.status_font_size
            )));
        }
        Ok(())
    }
}
