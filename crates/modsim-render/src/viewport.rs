//! The simulator viewport: camera, tool session and frame rendering.

use crate::renderer::{draw_error_marker, draw_status, FrameStats, GridLayout, RenderResult};
use kurbo::{Affine, Point, Rect, Size};
use modsim_core::camera::Camera;
use modsim_core::config::ViewConfig;
use modsim_core::input::{DragState, KeyEvent, MouseButton, PointerEvent};
use modsim_core::scene::SceneHandle;
use modsim_core::surface::Surface;
use modsim_core::tools::{Tool, ToolInput, ToolInputKind, ToolSession, ToolStatus};

/// Renders a simulation scene and handles pan, zoom and tool input.
///
/// The viewport never owns the scene. It locks the injected [`SceneHandle`]
/// for the scene part of each frame and while routing input to a tool.
#[derive(Debug)]
pub struct Viewport {
    camera: Camera,
    tools: ToolSession,
    scene: SceneHandle,
    config: ViewConfig,
    antialias: bool,
    drag: DragState,
    /// Last pointer position, used to position key events sent to tools.
    pointer: Point,
}

impl Viewport {
    pub fn new(scene: SceneHandle, config: ViewConfig) -> Self {
        Self {
            camera: Camera::new(&config),
            tools: ToolSession::new(),
            scene,
            antialias: config.antialias,
            config,
            drag: DragState::default(),
            pointer: Point::ZERO,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Resize the viewport. Rendering also picks the size up from the surface.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.camera.set_viewport_size(size);
    }

    /// Zoom in one step around a screen point.
    pub fn zoom_in(&mut self, x: f64, y: f64) -> bool {
        self.camera.zoom_in(Point::new(x, y))
    }

    /// Zoom out one step around a screen point.
    pub fn zoom_out(&mut self, x: f64, y: f64) -> bool {
        self.camera.zoom_out(Point::new(x, y))
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.camera.screen_to_world(screen_point)
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.camera.world_to_screen(world_point)
    }

    /// Activate a tool, cancelling the current one.
    pub fn set_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.set_tool(tool);
    }

    /// Cancel the active tool. Returns `false` if there was none.
    pub fn cancel_tool(&mut self) -> bool {
        self.tools.cancel_tool()
    }

    pub fn has_tool(&self) -> bool {
        self.tools.has_tool()
    }

    pub fn antialias(&self) -> bool {
        self.antialias
    }

    pub fn set_antialias(&mut self, enabled: bool) {
        self.antialias = enabled;
    }

    pub fn toggle_antialias(&mut self) {
        self.antialias = !self.antialias;
        log::debug!("Antialiasing {}", if self.antialias { "on" } else { "off" });
    }

    /// Draw one frame.
    ///
    /// Layers, bottom to top: background, grid, links, module bodies with
    /// their error markers, module labels, selection outlines, the active
    /// tool (world, then screen), and the status line. Each module layer is
    /// a separate pass so labels and outlines always sit above every body.
    pub fn render(&mut self, surface: &mut dyn Surface) -> RenderResult<FrameStats> {
        let theme = self.config.theme;
        let size = surface.size();
        let mut stats = FrameStats::default();

        surface.set_antialias(self.antialias);
        self.camera.set_viewport_size(size);
        let world = self.camera.transform();
        let base = surface.transform();

        surface.fill_rect(Rect::from_origin_size(Point::ZERO, size), theme.background.into());

        let rate = {
            let mut sim = self.scene.lock()?;

            if let Some(grid) = GridLayout::compute(&self.camera, sim.grid()) {
                surface.concat_transform(Affine::translate(grid.offset));
                grid.draw(surface, size, theme.grid.into());
                surface.set_transform(base);
            }

            surface.concat_transform(world);
            for (slot, link) in sim.link_slots().iter().enumerate() {
                match link {
                    Some(link) => {
                        link.draw(surface);
                        stats.links_drawn += 1;
                    }
                    None => {
                        log::warn!("Missing link in slot {} while drawing, skipped", slot);
                        stats.missing_links += 1;
                    }
                }
            }
            surface.set_transform(base);

            for module in sim.modules_mut() {
                module.update_transform();
                surface.concat_transform(world * module.transform());
                module.paint(surface);
                if module.has_error() {
                    draw_error_marker(surface, &theme);
                    stats.errored_modules += 1;
                }
                stats.modules_drawn += 1;
                surface.set_transform(base);
            }

            for module in sim.modules() {
                surface.concat_transform(world * module.transform());
                module.draw_label(surface);
                surface.set_transform(base);
            }

            for module in sim.modules().iter().filter(|module| module.is_selected()) {
                surface.concat_transform(world * module.transform());
                module.draw_bounds(surface);
                stats.selected_modules += 1;
                surface.set_transform(base);
            }

            sim.iterations_per_second()
        };

        if let Some(tool) = self.tools.tool() {
            surface.concat_transform(world);
            tool.paint_world(surface);
            surface.set_transform(base);
            tool.paint_screen(surface);
            stats.tool_painted = true;
        }

        surface.set_transform(base);
        draw_status(surface, rate, &self.config);

        Ok(stats)
    }

    /// Handle a pointer event. Returns whether the view needs a redraw.
    ///
    /// Scrolling zooms around the pointer. Middle-button drags always pan;
    /// left-button drags pan when no tool is active. Everything else goes to
    /// the active tool.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> RenderResult<bool> {
        self.pointer = event.position();
        match *event {
            PointerEvent::Scroll { position, delta } => {
                if delta.y < 0.0 {
                    Ok(self.camera.zoom_in(position))
                } else if delta.y > 0.0 {
                    Ok(self.camera.zoom_out(position))
                } else {
                    Ok(false)
                }
            }
            PointerEvent::Down { position, button } => {
                if button == MouseButton::Middle {
                    self.drag.begin(button, position);
                    return Ok(false);
                }
                match self.dispatch_to_tool(ToolInputKind::Press(button), position)? {
                    ToolStatus::Ignored => {
                        if button == MouseButton::Left && !self.tools.has_tool() {
                            self.drag.begin(button, position);
                        }
                        Ok(false)
                    }
                    ToolStatus::Continue | ToolStatus::Finished => Ok(true),
                }
            }
            PointerEvent::Move { position } => {
                if let Some(delta) = self.drag.update(position) {
                    self.camera.pan(delta);
                    return Ok(true);
                }
                Ok(self.dispatch_to_tool(ToolInputKind::Move, position)? != ToolStatus::Ignored)
            }
            PointerEvent::Up { position, button } => {
                if self.drag.end(button) {
                    return Ok(false);
                }
                Ok(self.dispatch_to_tool(ToolInputKind::Release(button), position)?
                    != ToolStatus::Ignored)
            }
        }
    }

    /// Handle a key event. Returns whether the view needs a redraw.
    ///
    /// `Escape` cancels the tool, `+`/`=` and `-` zoom around the centre,
    /// `0` resets the camera and `a` toggles antialiasing. Other keys are
    /// offered to the active tool.
    pub fn handle_key(&mut self, event: &KeyEvent) -> RenderResult<bool> {
        let KeyEvent::Pressed(key) = event else {
            return Ok(false);
        };
        let size = self.camera.viewport_size();
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        match key.as_str() {
            "Escape" => Ok(self.cancel_tool()),
            "+" | "=" => Ok(self.camera.zoom_in(center)),
            "-" => Ok(self.camera.zoom_out(center)),
            "0" => {
                self.camera.reset();
                Ok(true)
            }
            "a" | "A" => {
                self.toggle_antialias();
                Ok(true)
            }
            _ => Ok(self.dispatch_to_tool(ToolInputKind::Key(key.clone()), self.pointer)?
                != ToolStatus::Ignored),
        }
    }

    fn dispatch_to_tool(&mut self, kind: ToolInputKind, screen: Point) -> RenderResult<ToolStatus> {
        if !self.tools.has_tool() {
            return Ok(ToolStatus::Ignored);
        }
        let input = ToolInput {
            kind,
            screen,
            world: self.camera.screen_to_world(screen),
        };
        let mut sim = self.scene.lock()?;
        Ok(self.tools.dispatch(&input, &mut sim))
    }
}
