//! A small demo circuit and the background thread that "simulates" it.

use kurbo::{Affine, BezPath, Point, Rect, Size};
use modsim_core::config::Theme;
use modsim_core::scene::{Link, Module, SceneHandle, Simulation};
use modsim_core::surface::{Surface, TextStyle};
use modsim_core::tools::PlaceTool;
use peniko::Color;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const GATE_SIZE: Size = Size::new(60.0, 40.0);
const SELECTION_COLOR: Color = Color::from_rgba8(59, 130, 246, 255);

/// A rectangular logic block.
pub struct Gate {
    label: String,
    position: Point,
    rotation: f64,
    transform: Affine,
    selected: bool,
    fault: Arc<AtomicBool>,
}

impl Gate {
    pub fn new(label: impl Into<String>, position: Point) -> Self {
        Self {
            label: label.into(),
            position,
            rotation: 0.0,
            transform: Affine::IDENTITY,
            selected: false,
            fault: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn rotated(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Flag the simulation thread flips to put the gate in an error state.
    pub fn fault_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fault)
    }

    fn body(&self) -> Rect {
        Rect::from_center_size(Point::ZERO, GATE_SIZE)
    }
}

impl Module for Gate {
    fn update_transform(&mut self) {
        self.transform = Affine::translate(self.position.to_vec2()) * Affine::rotate(self.rotation);
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn paint(&self, surface: &mut dyn Surface) {
        let body = self.body();
        surface.fill_rect(body, Color::from_rgba8(240, 240, 240, 255));
        surface.stroke_rect(body, 2.0, Color::from_rgba8(60, 60, 60, 255));
    }

    fn has_error(&self) -> bool {
        self.fault.load(Ordering::Relaxed)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn draw_label(&self, surface: &mut dyn Surface) {
        let style = TextStyle {
            font_size: 12.0,
            ..TextStyle::default()
        };
        let body = self.body();
        surface.draw_text(&self.label, Point::new(body.x0 + 4.0, body.y1 - 6.0), &style);
    }

    fn draw_bounds(&self, surface: &mut dyn Surface) {
        surface.stroke_rect(self.body().inflate(4.0, 4.0), 1.5, SELECTION_COLOR);
    }
}

/// An orthogonal wire between two world points.
pub struct Wire {
    from: Point,
    to: Point,
}

impl Wire {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

impl Link for Wire {
    fn draw(&self, surface: &mut dyn Surface) {
        let mid_x = (self.from.x + self.to.x) / 2.0;
        let mut path = BezPath::new();
        path.move_to(self.from);
        path.line_to(Point::new(mid_x, self.from.y));
        path.line_to(Point::new(mid_x, self.to.y));
        path.line_to(self.to);
        surface.stroke_path(&path, 2.0, Color::from_rgba8(30, 120, 60, 255));
    }
}

/// Build the demo circuit. Returns the simulation and the fault flag of the
/// gate the simulation thread toggles.
pub fn demo_circuit(grid: f64) -> (Simulation, Arc<AtomicBool>) {
    let mut sim = Simulation::new(grid);

    let input = Gate::new("IN", Point::new(-160.0, 0.0));
    let and = Gate::new("AND", Point::new(0.0, -60.0)).selected();
    let not = Gate::new("NOT", Point::new(0.0, 60.0)).rotated(std::f64::consts::FRAC_PI_2);
    let output = Gate::new("OUT", Point::new(160.0, 0.0));
    let fault = not.fault_flag();

    for gate in [input, and, not, output] {
        sim.add_module(Box::new(gate));
    }
    sim.add_link(Box::new(Wire::new(Point::new(-130.0, 0.0), Point::new(-30.0, -60.0))));
    sim.add_link(Box::new(Wire::new(Point::new(-130.0, 0.0), Point::new(-20.0, 60.0))));
    sim.add_link(Box::new(Wire::new(Point::new(30.0, -60.0), Point::new(130.0, 0.0))));
    sim.add_link(Box::new(Wire::new(Point::new(20.0, 60.0), Point::new(130.0, 0.0))));

    (sim, fault)
}

/// Tool that drops a new gate where the user clicks, previewed in the
/// theme's tool colour.
pub fn gate_tool(theme: &Theme) -> PlaceTool {
    PlaceTool::new(
        "gate",
        GATE_SIZE,
        Box::new(|at| Box::new(Gate::new("NEW", at)) as Box<dyn Module>),
    )
    .with_color(theme.tool_preview.into())
}

/// Background thread standing in for the simulation engine. It updates the
/// iteration rate and periodically raises a fault, locking the scene the way
/// a real engine would.
pub struct SimulationThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationThread {
    pub fn spawn(scene: SceneHandle, fault: Arc<AtomicBool>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || {
            let mut window_start = Instant::now();
            let mut iterations = 0u64;
            let mut ticks = 0u64;
            while flag.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(2));
                iterations += 1;

                let elapsed = window_start.elapsed();
                if elapsed >= Duration::from_millis(500) {
                    let rate = iterations as f64 / elapsed.as_secs_f64();
                    match scene.lock() {
                        Ok(mut sim) => sim.set_iterations_per_second(rate),
                        Err(e) => {
                            log::error!("Simulation thread stopping: {}", e);
                            break;
                        }
                    }
                    ticks += 1;
                    fault.store(ticks % 8 >= 6, Ordering::Relaxed);
                    iterations = 0;
                    window_start = Instant::now();
                }
            }
        });
        Self {
            running,
            handle: Some(handle),
        }
    }
}

impl Drop for SimulationThread {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Simulation thread panicked");
            }
        }
    }
}
