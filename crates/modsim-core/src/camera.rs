//! Camera module for pan/zoom transforms.

use crate::config::ViewConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the world-to-view transform of the viewport.
///
/// Zoom is quantized: the scale is always `zoom_index * zoom_multiplier`
/// with the index held in `1..=zoom_limit`. The transform is derived from
/// the current fields on every call, so it always reflects the latest
/// offset, zoom and viewport size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in pixels.
    pub offset: Vec2,
    zoom_index: u32,
    zoom_multiplier: f64,
    zoom_limit: u32,
    initial_zoom_index: u32,
    viewport_size: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

impl Camera {
    /// Create a camera from the zoom settings of a view configuration.
    pub fn new(config: &ViewConfig) -> Self {
        let zoom_limit = config.zoom_limit.max(1);
        let initial_zoom_index = config.initial_zoom_index.clamp(1, zoom_limit);
        Self {
            offset: Vec2::ZERO,
            zoom_index: initial_zoom_index,
            zoom_multiplier: config.zoom_multiplier,
            zoom_limit,
            initial_zoom_index,
            viewport_size: Size::ZERO,
        }
    }

    /// Current zoom index.
    pub fn zoom_index(&self) -> u32 {
        self.zoom_index
    }

    /// Upper bound of the zoom index.
    pub fn zoom_limit(&self) -> u32 {
        self.zoom_limit
    }

    /// Current zoom scale.
    pub fn zoom(&self) -> f64 {
        f64::from(self.zoom_index) * self.zoom_multiplier
    }

    /// Jump to a zoom index without pivoting. Out-of-range values are clamped.
    pub fn set_zoom_index(&mut self, index: u32) {
        self.zoom_index = index.clamp(1, self.zoom_limit);
    }

    /// Size of the surface being drawn to.
    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    /// Screen position of the world origin.
    pub fn origin(&self) -> Point {
        Point::new(
            self.offset.x + self.viewport_size.width / 2.0,
            self.offset.y + self.viewport_size.height / 2.0,
        )
    }

    /// World-to-view transform: translate by the offset, then by half the
    /// viewport (world origin at the centre), then scale by the zoom.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset)
            * Affine::translate((self.viewport_size.width / 2.0, self.viewport_size.height / 2.0))
            * Affine::scale(self.zoom())
    }

    /// View-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom()) * Affine::translate(-self.origin().to_vec2())
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// The world-space rectangle currently visible.
    pub fn world_viewport(&self) -> Rect {
        let inv = self.inverse_transform();
        let top_left = inv * Point::ZERO;
        let bottom_right = inv * Point::new(self.viewport_size.width, self.viewport_size.height);
        Rect::from_points(top_left, bottom_right)
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom in one step, keeping the world point under `screen_point` fixed.
    ///
    /// Returns `false` and leaves the camera untouched at the upper bound.
    pub fn zoom_in(&mut self, screen_point: Point) -> bool {
        self.step_zoom(screen_point, 1)
    }

    /// Zoom out one step, keeping the world point under `screen_point` fixed.
    ///
    /// Returns `false` and leaves the camera untouched at index 1.
    pub fn zoom_out(&mut self, screen_point: Point) -> bool {
        self.step_zoom(screen_point, -1)
    }

    fn step_zoom(&mut self, screen_point: Point, step: i64) -> bool {
        let target = i64::from(self.zoom_index) + step;
        if target < 1 || target > i64::from(self.zoom_limit) {
            return false;
        }

        // Convert screen point to world before zoom
        let world_point = self.screen_to_world(screen_point);

        self.zoom_index = target as u32;

        // Shift the offset so world_point projects back onto screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset -= new_screen - screen_point;

        log::debug!(
            "Zoom index {} (scale {:.2}) at ({:.1}, {:.1})",
            self.zoom_index,
            self.zoom(),
            screen_point.x,
            screen_point.y
        );
        true
    }

    /// Reset camera to the origin and the initial zoom index.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom_index = self.initial_zoom_index;
    }
}
