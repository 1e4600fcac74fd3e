//! Scene collaborators: the simulation's modules and links.
//!
//! The simulation is owned elsewhere and mutated from its own thread. The
//! viewport only reads it, through a [`SceneHandle`] that hands out a coarse
//! lock for the duration of a frame.

use crate::error::{CoreError, CoreResult};
use crate::surface::Surface;
use kurbo::Affine;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default world-space grid unit.
pub const DEFAULT_GRID: f64 = 20.0;

/// A drawable connection between modules, drawn in world space.
pub trait Link: Send {
    fn draw(&self, surface: &mut dyn Surface);
}

/// A simulated component.
///
/// Every drawing method is called with the surface already transformed into
/// the module's own model space.
pub trait Module: Send {
    /// Recompute the model-to-world transform from position and orientation.
    fn update_transform(&mut self);

    /// Model-to-world transform computed by the last `update_transform`.
    fn transform(&self) -> Affine;

    /// Draw the module body.
    fn paint(&self, surface: &mut dyn Surface);

    /// Whether the module is in an error state.
    fn has_error(&self) -> bool {
        false
    }

    fn is_selected(&self) -> bool {
        false
    }

    fn draw_label(&self, _surface: &mut dyn Surface) {}

    /// Draw the selection outline.
    fn draw_bounds(&self, surface: &mut dyn Surface);
}

/// Index of a module in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub usize);

/// Index of a link slot in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// Modules and links of a running simulation.
///
/// Links live in slots. Removing a link empties its slot instead of shifting
/// the others, so a [`LinkId`] stays valid until [`Simulation::compact_links`].
pub struct Simulation {
    modules: Vec<Box<dyn Module>>,
    links: Vec<Option<Box<dyn Link>>>,
    grid: f64,
    iterations_per_second: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(DEFAULT_GRID)
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("modules", &self.modules.len())
            .field("link_slots", &self.links.len())
            .field("grid", &self.grid)
            .field("iterations_per_second", &self.iterations_per_second)
            .finish()
    }
}

impl Simulation {
    /// Create an empty simulation with the given grid unit.
    pub fn new(grid: f64) -> Self {
        Self {
            modules: Vec::new(),
            links: Vec::new(),
            grid,
            iterations_per_second: 0.0,
        }
    }

    pub fn add_module(&mut self, module: Box<dyn Module>) -> ModuleId {
        self.modules.push(module);
        ModuleId(self.modules.len() - 1)
    }

    pub fn module(&self, id: ModuleId) -> Option<&dyn Module> {
        self.modules.get(id.0).map(|m| m.as_ref())
    }

    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut Box<dyn Module>> {
        self.modules.get_mut(id.0)
    }

    /// Modules in draw order.
    pub fn modules(&self) -> &[Box<dyn Module>] {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut [Box<dyn Module>] {
        &mut self.modules
    }

    pub fn add_link(&mut self, link: Box<dyn Link>) -> LinkId {
        self.links.push(Some(link));
        LinkId(self.links.len() - 1)
    }

    /// Remove a link, leaving its slot empty.
    pub fn remove_link(&mut self, id: LinkId) -> Option<Box<dyn Link>> {
        self.links.get_mut(id.0).and_then(Option::take)
    }

    /// Link slots in draw order. Empty slots are removed links.
    pub fn link_slots(&self) -> &[Option<Box<dyn Link>>] {
        &self.links
    }

    /// Number of links actually present.
    pub fn link_count(&self) -> usize {
        self.links.iter().filter(|slot| slot.is_some()).count()
    }

    /// Drop empty link slots. Invalidates every [`LinkId`]; returns how many
    /// slots were dropped.
    pub fn compact_links(&mut self) -> usize {
        let before = self.links.len();
        self.links.retain(Option::is_some);
        before - self.links.len()
    }

    /// World-space grid unit.
    pub fn grid(&self) -> f64 {
        self.grid
    }

    pub fn set_grid(&mut self, grid: f64) {
        self.grid = grid;
    }

    pub fn iterations_per_second(&self) -> f64 {
        self.iterations_per_second
    }

    pub fn set_iterations_per_second(&mut self, rate: f64) {
        self.iterations_per_second = rate;
    }
}

/// Shared, lock-guarded access to a [`Simulation`].
#[derive(Debug, Clone, Default)]
pub struct SceneHandle {
    inner: Arc<Mutex<Simulation>>,
}

impl SceneHandle {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulation)),
        }
    }

    /// Acquire the scene lock. Blocks while the simulation thread holds it.
    pub fn lock(&self) -> CoreResult<MutexGuard<'_, Simulation>> {
        self.inner.lock().map_err(|_| CoreError::ScenePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct NullLink;

    impl Link for NullLink {
        fn draw(&self, _surface: &mut dyn Surface) {}
    }

    struct Dot {
        transform: Affine,
    }

    impl Module for Dot {
        fn update_transform(&mut self) {
            self.transform = Affine::translate((1.0, 2.0));
        }

        fn transform(&self) -> Affine {
            self.transform
        }

        fn paint(&self, _surface: &mut dyn Surface) {}

        fn draw_bounds(&self, _surface: &mut dyn Surface) {}
    }

    #[test]
    fn test_removed_link_leaves_empty_slot() {
        let mut sim = Simulation::default();
        let first = sim.add_link(Box::new(NullLink));
        let second = sim.add_link(Box::new(NullLink));

        assert!(sim.remove_link(first).is_some());
        assert!(sim.remove_link(first).is_none());
        assert_eq!(sim.link_slots().len(), 2);
        assert_eq!(sim.link_count(), 1);
        assert!(sim.link_slots()[second.0].is_some());

        assert_eq!(sim.compact_links(), 1);
        assert_eq!(sim.link_slots().len(), 1);
    }

    #[test]
    fn test_modules_keep_insertion_order() {
        let mut sim = Simulation::new(10.0);
        let a = sim.add_module(Box::new(Dot { transform: Affine::IDENTITY }));
        let b = sim.add_module(Box::new(Dot { transform: Affine::IDENTITY }));
        assert_eq!((a, b), (ModuleId(0), ModuleId(1)));

        sim.module_mut(b).unwrap().update_transform();
        assert_eq!(sim.module(a).unwrap().transform(), Affine::IDENTITY);
        assert_eq!(sim.module(b).unwrap().transform(), Affine::translate((1.0, 2.0)));
        assert!((sim.grid() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_handle_shares_state_across_threads() {
        let handle = SceneHandle::default();
        let writer = handle.clone();
        thread::spawn(move || {
            writer.lock().unwrap().set_iterations_per_second(42.5);
        })
        .join()
        .unwrap();

        assert!((handle.lock().unwrap().iterations_per_second() - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let handle = SceneHandle::default();
        let writer = handle.clone();
        let result = thread::spawn(move || {
            let _guard = writer.lock().unwrap();
            panic!("simulation thread died");
        })
        .join();
        assert!(result.is_err());

        assert!(matches!(handle.lock(), Err(CoreError::ScenePoisoned)));
    }
}
