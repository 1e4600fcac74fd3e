//! Grid snapping for tools that place things in world space.

use kurbo::Point;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the point moved onto a grid intersection.
    pub snapped: bool,
}

impl SnapResult {
    /// A result that leaves the point where it was.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped: false,
        }
    }
}

/// Snap a world point to the nearest grid intersection.
///
/// A non-positive or non-finite grid size disables snapping.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return SnapResult::none(point);
    }
    let snapped_x = (point.x / grid_size).round() * grid_size;
    let snapped_y = (point.y / grid_size).round() * grid_size;

    SnapResult {
        point: Point::new(snapped_x, snapped_y),
        snapped: true,
    }
}
