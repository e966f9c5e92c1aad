//! Testing utilities for popmenu.
//!
//! Provides in-memory stand-ins for the host collaborators a menu needs:
//! - [`FakeOverlayService`] / [`FakeOverlay`]: records attach, detach and
//!   dispose calls and lets tests click the backdrop or press keys.
//! - [`RecordingFocusService`]: tracks the focused element and every focus
//!   call with its origin.
//! - [`TestServices`]: both fakes plus a [`Scheduler`] and an
//!   [`IdAllocator`], ready to be turned into a menu environment.

mod focus;
mod overlay;

pub use focus::{FocusRecord, RecordingFocusService};
pub use overlay::{FakeOverlay, FakeOverlayService};

use std::rc::Rc;

use popmenu_core::{ElementId, IdAllocator, Scheduler};

/// Shared fakes for one test.
#[derive(Clone)]
pub struct TestServices {
    /// Overlay host.
    pub overlays: Rc<FakeOverlayService>,
    /// Focus host.
    pub focus: Rc<RecordingFocusService>,
    /// Cooperative scheduler driven by the test.
    pub scheduler: Rc<Scheduler>,
    /// Identifier source.
    pub ids: Rc<IdAllocator>,
}

impl TestServices {
    /// Create fresh fakes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            overlays: Rc::new(FakeOverlayService::new()),
            focus: Rc::new(RecordingFocusService::new()),
            scheduler: Rc::new(Scheduler::new()),
            ids: Rc::new(IdAllocator::new()),
        }
    }

    /// Allocate an element to act as an anchor.
    pub fn element(&self) -> ElementId {
        self.ids.next_element_id()
    }

    /// Advance the scheduler by one tick.
    pub fn tick(&self) -> &Self {
        self.scheduler.tick();
        self
    }

    /// Reach a render-stable point without advancing time.
    pub fn stabilize(&self) -> &Self {
        self.scheduler.stabilize();
        self
    }

    /// Run every pending task.
    pub fn settle(&self) -> &Self {
        self.scheduler.run_until_idle();
        self
    }

    /// Element currently holding focus.
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        popmenu_core::FocusService::focused_element(&*self.focus)
    }
}

impl Default for TestServices {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_core::{FocusOptions, FocusService, OverlayConfig, OverlayService};
    use std::cell::Cell;

    #[test]
    fn test_services_share_state_across_clones() {
        let services = TestServices::new();
        let clone = services.clone();

        clone.overlays.create(OverlayConfig::default());
        assert_eq!(services.overlays.created_count(), 1);

        let a = services.element();
        let b = clone.element();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tick_and_settle() {
        let services = TestServices::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sch = Rc::clone(&services.scheduler);
        services.scheduler.schedule(move || {
            c.set(c.get() + 1);
            let c2 = Rc::clone(&c);
            sch.schedule(move || c2.set(c2.get() + 1));
        });

        services.tick();
        assert_eq!(count.get(), 1);
        services.settle();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_focused() {
        let services = TestServices::new();
        let element = services.element();
        services.focus.focus(element, FocusOptions::default());
        assert_eq!(services.focused(), Some(element));
    }
}
