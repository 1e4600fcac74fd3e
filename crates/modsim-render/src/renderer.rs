//! Frame building blocks: errors, grid layout, error marker, status line.

use kurbo::{Point, Rect, Size, Vec2};
use modsim_core::camera::Camera;
use modsim_core::config::{Theme, ViewConfig};
use modsim_core::error::CoreError;
use modsim_core::surface::{Surface, TextStyle};
use peniko::Color;
use thiserror::Error;

/// Grids with cells narrower than one whole pixel are not drawn. The offset
/// is taken modulo the truncated spacing, which must not be zero.
pub const MIN_GRID_SPACING: f64 = 1.0;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Scene unavailable: {0}")]
    Scene(#[from] CoreError),
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// What a frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub links_drawn: usize,
    /// Empty link slots skipped with a warning.
    pub missing_links: usize,
    pub modules_drawn: usize,
    /// Modules that got an error marker.
    pub errored_modules: usize,
    /// Modules that got a selection outline.
    pub selected_modules: usize,
    pub tool_painted: bool,
}

/// Screen-space placement of the background grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Distance between grid lines in pixels.
    pub spacing: f64,
    /// Screen translation applied to the whole grid.
    pub offset: Vec2,
    /// Number of whole cells across the viewport.
    pub columns: usize,
    /// Number of whole cells down the viewport.
    pub rows: usize,
}

impl GridLayout {
    /// Lay out a grid of `grid_unit` world units for the camera's current
    /// zoom and position. Returns `None` when a cell is narrower than one
    /// whole pixel or the spacing is not finite.
    ///
    /// The offset is the world origin's screen position modulo the spacing,
    /// both truncated to whole pixels, so lines slide continuously with the
    /// camera and wrap every cell.
    pub fn compute(camera: &Camera, grid_unit: f64) -> Option<Self> {
        let spacing = grid_unit * camera.zoom();
        if !spacing.is_finite() || spacing < MIN_GRID_SPACING {
            return None;
        }

        let step = spacing as i64;
        let origin = camera.origin();
        let offset = Vec2::new(
            ((origin.x as i64) % step) as f64,
            ((origin.y as i64) % step) as f64,
        );

        let size = camera.viewport_size();
        Some(Self {
            spacing,
            offset,
            columns: (size.width / spacing) as usize,
            rows: (size.height / spacing) as usize,
        })
    }

    /// Stroke the grid lines. The surface transform should already include
    /// [`GridLayout::offset`].
    pub fn draw(&self, surface: &mut dyn Surface, size: Size, color: Color) {
        let spacing = self.spacing;

        // Vertical lines
        for i in 0..=self.columns + 1 {
            let x = i as f64 * spacing;
            surface.stroke_line(
                Point::new(x, -spacing),
                Point::new(x, size.height + spacing),
                1.0,
                color,
            );
        }

        // Horizontal lines
        for i in 0..=self.rows + 1 {
            let y = i as f64 * spacing;
            surface.stroke_line(
                Point::new(-spacing, y),
                Point::new(size.width + spacing, y),
                1.0,
                color,
            );
        }
    }
}

/// Draw the error flag centred on the module's origin, in model space.
pub fn draw_error_marker(surface: &mut dyn Surface, theme: &Theme) {
    surface.stroke_circle(Point::ZERO, 30.0, 1.0, theme.error_edge.into());
    surface.fill_circle(Point::ZERO, 27.0, theme.error_fill.into());

    // Exclamation mark
    let text: Color = theme.error_text.into();
    surface.fill_rect(Rect::new(-3.0, -16.0, 3.0, 4.0), text);
    surface.fill_circle(Point::new(0.0, 11.0), 3.0, text);
}

/// Format an iteration rate with at most two decimals and no trailing zeros
/// (`12.5`, `3.14`, `7`).
pub fn format_rate(rate: f64) -> String {
    if rate.is_nan() {
        return "NaN".to_string();
    }
    if rate.is_infinite() {
        return if rate > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let mut text = format!("{:.2}", rate);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// The status readout: the rate right-aligned to `width`, then the unit.
pub fn status_line(rate: f64, width: usize) -> String {
    format!("{:>width$} iterations/s", format_rate(rate), width = width)
}

/// Draw the status readout at the configured screen position.
pub fn draw_status(surface: &mut dyn Surface, rate: f64, config: &ViewConfig) {
    let style = TextStyle {
        font_size: config.status_font_size,
        bold: true,
        monospace: true,
        color: config.theme.status_text.into(),
    };
    surface.draw_text(&status_line(rate, config.status_width), config.status_origin, &style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsim_core::config::SerializableColor;
    use modsim_core::surface::{DrawCommand, RecordingSurface};

    fn camera(zoom_index: u32) -> Camera {
        let mut camera = Camera::default();
        camera.set_viewport_size(Size::new(800.0, 600.0));
        camera.set_zoom_index(zoom_index);
        camera
    }

    #[test]
    fn test_grid_spacing_follows_zoom() {
        for index in [1, 12] {
            let camera = camera(index);
            let grid = GridLayout::compute(&camera, 20.0).unwrap();
            assert!((grid.spacing - 20.0 * camera.zoom()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_grid_offset_wraps_with_camera() {
        let mut camera = camera(5); // 20px cells
        let grid = GridLayout::compute(&camera, 20.0).unwrap();
        assert_eq!(grid.offset, Vec2::new(0.0, 0.0)); // 400 % 20, 300 % 20
        assert_eq!((grid.columns, grid.rows), (40, 30));

        camera.pan(Vec2::new(7.0, -33.0));
        let grid = GridLayout::compute(&camera, 20.0).unwrap();
        assert_eq!(grid.offset, Vec2::new(7.0, 7.0)); // 407 % 20, 267 % 20
    }

    #[test]
    fn test_grid_offset_keeps_dividend_sign() {
        let mut camera = camera(5);
        camera.pan(Vec2::new(-450.0, 0.0));
        let grid = GridLayout::compute(&camera, 20.0).unwrap();
        assert_eq!(grid.offset.x, -10.0); // -50 % 20
    }

    #[test]
    fn test_sub_pixel_or_degenerate_grid_is_skipped() {
        let camera = camera(1);
        assert!(GridLayout::compute(&camera, 4.0).is_none()); // 0.8px cells
        assert!(GridLayout::compute(&camera, 0.0).is_none());
        assert!(GridLayout::compute(&camera, f64::NAN).is_none());
    }

    #[test]
    fn test_one_pixel_grid_is_drawn() {
        let mut camera = camera(1);
        camera.pan(Vec2::new(0.5, 0.0));
        let grid = GridLayout::compute(&camera, 5.0).unwrap();
        assert!((grid.spacing - 1.0).abs() < 1e-12);
        assert_eq!(grid.offset, Vec2::ZERO); // whole pixels % 1
        assert_eq!((grid.columns, grid.rows), (800, 600));
    }

    #[test]
    fn test_grid_draws_covering_lines() {
        let camera = camera(5);
        let grid = GridLayout::compute(&camera, 20.0).unwrap();
        let mut surface = RecordingSurface::new(Size::new(800.0, 600.0));
        grid.draw(&mut surface, Size::new(800.0, 600.0), Color::BLACK);
        assert_eq!(surface.commands().len(), (40 + 2) + (30 + 2));
    }

    #[test]
    fn test_error_marker_colors() {
        let theme = Theme::default();
        let mut surface = RecordingSurface::new(Size::new(100.0, 100.0));
        draw_error_marker(&mut surface, &theme);

        let colors: Vec<SerializableColor> = surface
            .commands()
            .iter()
            .map(|command| match command {
                DrawCommand::Fill { color, .. } | DrawCommand::Stroke { color, .. } => {
                    SerializableColor::from(*color)
                }
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(
            colors,
            vec![theme.error_edge, theme.error_fill, theme.error_text, theme.error_text]
        );
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0");
        assert_eq!(format_rate(-0.0), "0");
        assert_eq!(format_rate(2.0), "2");
        assert_eq!(format_rate(12.5), "12.5");
        assert_eq!(format_rate(3.14159), "3.14");
        assert_eq!(format_rate(1234.567), "1234.57");
        assert_eq!(format_rate(0.004), "0");
        assert_eq!(format_rate(100.0), "100");
        assert_eq!(format_rate(f64::NAN), "NaN");
    }

    #[test]
    fn test_status_line_padding() {
        let line = status_line(42.0, 20);
        assert_eq!(line, format!("{}42 iterations/s", " ".repeat(18)));

        let long = status_line(1e24, 20);
        assert!(!long.starts_with(' '));
        assert!(long.ends_with(" iterations/s"));
    }

    #[test]
    fn test_draw_status_uses_config() {
        let config = ViewConfig::default();
        let mut surface = RecordingSurface::new(Size::new(200.0, 50.0));
        draw_status(&mut surface, 7.25, &config);

        match &surface.commands()[0] {
            DrawCommand::Text { text, origin, style, .. } => {
                assert_eq!(text, &status_line(7.25, 20));
                assert_eq!(*origin, Point::new(10.0, 10.0));
                assert!(style.bold && style.monospace);
                assert!((style.font_size - 10.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
