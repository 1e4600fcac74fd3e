use super::{Tool, ToolInput, ToolInputKind, ToolStatus};
use crate::config::Theme;
use crate::input::MouseButton;
use crate::scene::{Module, Simulation};
use crate::snap::snap_to_grid;
use crate::surface::{Surface, TextStyle};
use kurbo::{Point, Rect, Size};
use peniko::Color;

/// Builds the module to insert at a world position.
pub type ModuleFactory = Box<dyn FnMut(Point) -> Box<dyn Module> + Send>;

/// Places a new module at the grid-snapped cursor position.
///
/// While active it previews the module footprint under the cursor and shows
/// a hint in the corner of the screen. A left click inserts the module and
/// finishes the tool.
pub struct PlaceTool {
    label: String,
    footprint: Size,
    factory: ModuleFactory,
    color: Color,
    hover: Option<Point>,
}

impl PlaceTool {
    pub fn new(label: impl Into<String>, footprint: Size, factory: ModuleFactory) -> Self {
        Self {
            label: label.into(),
            footprint,
            factory,
            color: Theme::default().tool_preview.into(),
            hover: None,
        }
    }

    /// Set the preview outline color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Snapped world position the module would be placed at.
    pub fn hover(&self) -> Option<Point> {
        self.hover
    }

    fn preview_rect(&self, center: Point) -> Rect {
        Rect::from_center_size(center, self.footprint)
    }
}

impl Tool for PlaceTool {
    fn name(&self) -> &str {
        "place"
    }

    fn paint_world(&self, surface: &mut dyn Surface) {
        if let Some(center) = self.hover {
            surface.stroke_rect(self.preview_rect(center), 2.0, self.color);
        }
    }

    fn paint_screen(&self, surface: &mut dyn Surface) {
        let style = TextStyle {
            font_size: 10.0,
            color: self.color,
            ..TextStyle::default()
        };
        let hint = format!("Placing {}: click to place, Esc to cancel", self.label);
        surface.draw_text(&hint, Point::new(10.0, 26.0), &style);
    }

    fn cancel(&mut self) {
        self.hover = None;
    }

    fn handle_input(&mut self, input: &ToolInput, scene: &mut Simulation) -> ToolStatus {
        let snapped = snap_to_grid(input.world, scene.grid()).point;
        match input.kind {
            ToolInputKind::Move => {
                self.hover = Some(snapped);
                ToolStatus::Continue
            }
            ToolInputKind::Press(MouseButton::Left) => {
                let module = (self.factory)(snapped);
                let id = scene.add_module(module);
                log::debug!("Placed {} as module {} at {:?}", self.label, id.0, snapped);
                self.hover = None;
                ToolStatus::Finished
            }
            _ => ToolStatus::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use crate::tools::ToolSession;
    use kurbo::Affine;

    struct Block {
        at: Point,
    }

    impl Module for Block {
        fn update_transform(&mut self) {}

        fn transform(&self) -> Affine {
            Affine::translate(self.at.to_vec2())
        }

        fn paint(&self, _surface: &mut dyn Surface) {}

        fn draw_bounds(&self, _surface: &mut dyn Surface) {}
    }

    fn place_tool() -> PlaceTool {
        PlaceTool::new(
            "block",
            Size::new(40.0, 20.0),
            Box::new(|at| Box::new(Block { at }) as Box<dyn Module>),
        )
    }

    fn input(kind: ToolInputKind, world: Point) -> ToolInput {
        ToolInput {
            kind,
            screen: Point::ZERO,
            world,
        }
    }

    #[test]
    fn test_hover_snaps_to_grid() {
        let mut tool = place_tool();
        let mut sim = Simulation::new(20.0);
        let status = tool.handle_input(&input(ToolInputKind::Move, Point::new(31.0, 9.0)), &mut sim);
        assert_eq!(status, ToolStatus::Continue);
        assert_eq!(tool.hover(), Some(Point::new(40.0, 0.0)));

        let mut surface = RecordingSurface::new(Size::new(100.0, 100.0));
        tool.paint_world(&mut surface);
        assert!(matches!(surface.commands(), [DrawCommand::Stroke { .. }]));
    }

    #[test]
    fn test_click_places_module_and_finishes() {
        let mut session = ToolSession::new();
        session.set_tool(Box::new(place_tool()));
        let mut sim = Simulation::new(10.0);

        let status = session.dispatch(&input(ToolInputKind::Press(MouseButton::Left), Point::new(12.0, 18.0)), &mut sim);
        assert_eq!(status, ToolStatus::Finished);
        assert!(!session.has_tool());
        assert_eq!(sim.modules().len(), 1);
        assert_eq!(sim.modules()[0].transform(), Affine::translate((10.0, 20.0)));
    }

    #[test]
    fn test_cancel_clears_preview() {
        let mut tool = place_tool();
        let mut sim = Simulation::default();
        tool.handle_input(&input(ToolInputKind::Move, Point::new(1.0, 1.0)), &mut sim);
        tool.cancel();
        assert_eq!(tool.hover(), None);

        let mut surface = RecordingSurface::new(Size::new(100.0, 100.0));
        tool.paint_world(&mut surface);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_right_click_is_ignored() {
        let mut tool = place_tool();
        let mut sim = Simulation::default();
        let status = tool.handle_input(&input(ToolInputKind::Press(MouseButton::Right), Point::ZERO), &mut sim);
        assert_eq!(status, ToolStatus::Ignored);
        assert!(sim.modules().is_empty());
    }
}
