//! Drawing surface abstraction.
//!
//! Modules, links and tools draw through [`Surface`] so the viewport does not
//! depend on a particular rendering backend. [`RecordingSurface`] keeps a
//! display list and is what tests and headless hosts use.

use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, Shape as KurboShape, Size};
use peniko::Color;

/// Flattening tolerance used when converting kurbo shapes to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Text appearance.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f64,
    pub bold: bool,
    pub monospace: bool,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            bold: false,
            monospace: false,
            color: Color::BLACK,
        }
    }
}

/// A 2D drawing target with a current transform.
///
/// Every drawing call is interpreted in the coordinate system set by the
/// current transform. Text origins are baseline positions.
pub trait Surface {
    /// Pixel size of the surface.
    fn size(&self) -> Size;

    fn antialias(&self) -> bool;

    /// Toggle antialiasing. Affects rendering quality only.
    fn set_antialias(&mut self, enabled: bool);

    fn transform(&self) -> Affine;

    fn set_transform(&mut self, transform: Affine);

    fn fill_path(&mut self, path: &BezPath, color: Color);

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color);

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle);

    /// Post-multiply the current transform, like `Graphics2D::transform`.
    fn concat_transform(&mut self, transform: Affine) {
        let current = self.transform();
        self.set_transform(current * transform);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_path(&rect.to_path(PATH_TOLERANCE), color);
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Color) {
        self.stroke_path(&rect.to_path(PATH_TOLERANCE), width, color);
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.stroke_path(&Line::new(from, to).to_path(PATH_TOLERANCE), width, color);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.fill_path(&Circle::new(center, radius).to_path(PATH_TOLERANCE), color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color) {
        self.stroke_path(&Circle::new(center, radius).to_path(PATH_TOLERANCE), width, color);
    }
}

/// One recorded drawing operation, with the transform it was issued under.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Fill {
        path: BezPath,
        color: Color,
        transform: Affine,
    },
    Stroke {
        path: BezPath,
        width: f64,
        color: Color,
        transform: Affine,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
        transform: Affine,
    },
    Antialias(bool),
}

impl DrawCommand {
    pub fn transform(&self) -> Option<Affine> {
        match self {
            DrawCommand::Fill { transform, .. }
            | DrawCommand::Stroke { transform, .. }
            | DrawCommand::Text { transform, .. } => Some(*transform),
            DrawCommand::Antialias(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Surface that records a display list instead of rasterizing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    transform: Affine,
    antialias: bool,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            transform: Affine::IDENTITY,
            antialias: true,
            commands: Vec::new(),
        }
    }

    /// Recorded commands in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Recorded text strings in issue order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands.iter().filter_map(DrawCommand::text).collect()
    }

    /// Drop recorded commands and reset the transform.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.transform = Affine::IDENTITY;
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn antialias(&self) -> bool {
        self.antialias
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.antialias = enabled;
        self.commands.push(DrawCommand::Antialias(enabled));
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            color,
            transform: self.transform,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            width,
            color,
            transform: self.transform,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            style: *style,
            transform: self.transform,
        });
    }
}
