//! Window, GPU surface and event loop around the viewport.

use crate::demo::{demo_circuit, gate_tool, SimulationThread};
use kurbo::{Point, Size, Vec2};
use modsim_core::config::ViewConfig;
use modsim_core::error::ConfigError;
use modsim_core::input::{KeyEvent, MouseButton as ViewButton, PointerEvent};
use modsim_core::scene::SceneHandle;
use modsim_render::{RenderResult, RendererError, Viewport, VelloSurface};
use std::sync::Arc;
use thiserror::Error;
use vello::util::{RenderContext, RenderSurface};
use vello::wgpu::PresentMode;
use vello::{RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Pixels per scroll line when converting line deltas.
const LINE_SCROLL: f64 = 20.0;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Event loop error: {0}")]
    EventLoop(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub view: ViewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "ModSim".to_string(),
            width: 1280,
            height: 800,
            view: ViewConfig::default(),
        }
    }
}

/// Runtime state that exists once the window and GPU surface are up.
struct AppState {
    window: Arc<Window>,
    surface: RenderSurface<'static>,
    vello_renderer: vello::Renderer,
    /// Vello renders to Rgba8Unorm; the blitter converts to the surface format.
    texture_blitter: vello::wgpu::util::TextureBlitter,
    canvas: VelloSurface,
    viewport: Viewport,
    cursor: Point,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    scene: SceneHandle,
    state: Option<AppState>,
    render_cx: Option<RenderContext>,
    _simulation: SimulationThread,
}

impl App {
    /// Create the application with the demo circuit loaded and its
    /// simulation thread running.
    pub fn with_config(config: AppConfig) -> Self {
        let (circuit, fault) = demo_circuit(modsim_core::scene::DEFAULT_GRID);
        let scene = SceneHandle::new(circuit);
        let simulation = SimulationThread::spawn(scene.clone(), fault);
        Self {
            config,
            scene,
            state: None,
            render_cx: None,
            _simulation: simulation,
        }
    }

    /// Run the application until the window closes.
    pub async fn run(config: AppConfig) -> Result<(), AppError> {
        config.view.validate()?;
        let event_loop = EventLoop::new().map_err(|e| AppError::EventLoop(e.to_string()))?;
        let mut app = App::with_config(config);
        event_loop
            .run_app(&mut app)
            .map_err(|e| AppError::EventLoop(e.to_string()))
    }

    fn init_state(&mut self, window: Arc<Window>) -> RenderResult<()> {
        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };
        log::info!("Surface size: {}x{}", width, height);

        let render_cx = self.render_cx.get_or_insert_with(RenderContext::new);
        let surface: RenderSurface<'static> = pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        ))
        .map_err(|e| RendererError::InitFailed(format!("surface creation: {e}")))?;

        let device = &render_cx.devices[surface.dev_id].device;
        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(format!("Vello renderer: {e}")))?;
        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let pixel_size = Size::new(f64::from(width), f64::from(height));
        let mut viewport = Viewport::new(self.scene.clone(), self.config.view.clone());
        viewport.set_viewport_size(pixel_size);

        window.request_redraw();
        self.state = Some(AppState {
            window,
            surface,
            vello_renderer,
            texture_blitter,
            canvas: VelloSurface::new(pixel_size),
            viewport,
            cursor: Point::ZERO,
        });
        Ok(())
    }

    fn redraw(&mut self) -> RenderResult<()> {
        let (Some(state), Some(render_cx)) = (self.state.as_mut(), self.render_cx.as_ref()) else {
            return Ok(());
        };

        let width = state.surface.config.width;
        let height = state.surface.config.height;
        state.canvas.begin_frame(Size::new(f64::from(width), f64::from(height)));
        state.viewport.render(&mut state.canvas)?;
        let scene = state.canvas.take_scene();

        let device_handle = &render_cx.devices[state.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match state.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                return Ok(());
            }
        };

        let params = RenderParams {
            base_color: self.config.view.theme.background.into(),
            width,
            height,
            antialiasing_method: state.canvas.aa_config(),
        };

        // Storage binding is only available for Rgba8Unorm, so render there and blit
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_texture_view =
            render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        state
            .vello_renderer
            .render_to_texture(device, queue, &scene, &render_texture_view, &params)
            .map_err(|e| RendererError::RenderFailed(e.to_string()))?;

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("blit encoder"),
        });
        state
            .texture_blitter
            .copy(device, &mut encoder, &render_texture_view, &surface_view);
        queue.submit(std::iter::once(encoder.finish()));

        surface_texture.present();
        // The status line tracks a live rate, so keep redrawing
        state.window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        log::info!("Creating window...");
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_state(window) {
            log::error!("{}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if matches!(event, WindowEvent::RedrawRequested) {
            if let Err(e) = self.redraw() {
                log::error!("Failed to draw frame: {}", e);
            }
            return;
        }

        let Some(state) = self.state.as_mut() else {
            return;
        };

        let handled = match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(render_cx) = self.render_cx.as_ref() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state
                    .viewport
                    .set_viewport_size(Size::new(f64::from(size.width), f64::from(size.height)));
                Ok(true)
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.cursor = Point::new(position.x, position.y);
                state.viewport.handle_pointer(&PointerEvent::Move {
                    position: state.cursor,
                })
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let Some(button) = map_button(button) else {
                    return;
                };
                let position = state.cursor;
                let event = match button_state {
                    ElementState::Pressed => PointerEvent::Down { position, button },
                    ElementState::Released => PointerEvent::Up { position, button },
                };
                state.viewport.handle_pointer(&event)
            }
            WindowEvent::MouseWheel { delta, .. } => state.viewport.handle_pointer(&PointerEvent::Scroll {
                position: state.cursor,
                delta: scroll_delta(delta),
            }),
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(name) = key_name(&event.logical_key) else {
                    return;
                };
                if event.state == ElementState::Pressed && name == "p" {
                    state.viewport.set_tool(Box::new(gate_tool(&self.config.view.theme)));
                    Ok(true)
                } else {
                    let key = match event.state {
                        ElementState::Pressed => KeyEvent::Pressed(name),
                        ElementState::Released => KeyEvent::Released(name),
                    };
                    state.viewport.handle_key(&key)
                }
            }
            _ => Ok(false),
        };

        match handled {
            Ok(true) => state.window.request_redraw(),
            Ok(false) => {}
            Err(e) => log::error!("Input handling failed: {}", e),
        }
    }
}

fn map_button(button: MouseButton) -> Option<ViewButton> {
    match button {
        MouseButton::Left => Some(ViewButton::Left),
        MouseButton::Right => Some(ViewButton::Right),
        MouseButton::Middle => Some(ViewButton::Middle),
        _ => None,
    }
}

/// Winit reports positive y when scrolling up; the viewport expects negative.
fn scroll_delta(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(f64::from(x), -f64::from(y)) * LINE_SCROLL,
        MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x, -pos.y),
    }
}

fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
        Key::Character(c) => Some(c.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_scroll_up_is_negative() {
        assert!(scroll_delta(MouseScrollDelta::LineDelta(0.0, 1.0)).y < 0.0);
        assert!(scroll_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -3.0))).y > 0.0);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(&Key::Named(NamedKey::Escape)).as_deref(), Some("Escape"));
        assert_eq!(key_name(&Key::Character("+".into())).as_deref(), Some("+"));
        assert_eq!(key_name(&Key::Named(NamedKey::Shift)), None);
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(map_button(MouseButton::Middle), Some(ViewButton::Middle));
        assert_eq!(map_button(MouseButton::Back), None);
    }

    #[test]
    fn test_invalid_view_config_is_an_app_error() {
        let mut view = ViewConfig::default();
        view.zoom_limit = 0;
        let err = AppError::from(view.validate().unwrap_err());
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_renderer_failures_are_typed() {
        let err = RendererError::InitFailed("no adapter".to_string());
        assert_eq!(err.to_string(), "Initialization failed: no adapter");
        let err = RendererError::RenderFailed("lost device".to_string());
        assert_eq!(err.to_string(), "Render failed: lost device");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.view.validate().is_ok());
        assert_eq!((config.width, config.height), (1280, 800));
    }
}
