//! Shared collaborators for menu widgets.

use std::fmt;
use std::rc::Rc;

use popmenu_core::{
    Direction, FocusService, IdAllocator, MenuDefaultOptions, OverlayService, Scheduler,
};

/// Everything a menu widget needs from the application.
///
/// Built once by the application root and cloned into every panel, trigger
/// and item. Clones share the same services, scheduler and id allocator.
#[derive(Clone)]
pub struct MenuEnvironment {
    overlays: Rc<dyn OverlayService>,
    focus: Rc<dyn FocusService>,
    scheduler: Rc<Scheduler>,
    ids: Rc<IdAllocator>,
    options: MenuDefaultOptions,
    direction: Direction,
}

impl MenuEnvironment {
    /// Create an environment with a fresh scheduler and id allocator.
    #[must_use]
    pub fn new(overlays: Rc<dyn OverlayService>, focus: Rc<dyn FocusService>) -> Self {
        Self {
            overlays,
            focus,
            scheduler: Rc::new(Scheduler::new()),
            ids: Rc::new(IdAllocator::new()),
            options: MenuDefaultOptions::default(),
            direction: Direction::Ltr,
        }
    }

    /// Use an existing scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Rc<Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Use an existing id allocator.
    #[must_use]
    pub fn with_ids(mut self, ids: Rc<IdAllocator>) -> Self {
        self.ids = ids;
        self
    }

    /// Set the defaults copied into new panels.
    #[must_use]
    pub fn with_options(mut self, options: MenuDefaultOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the document direction.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Overlay host.
    #[must_use]
    pub fn overlays(&self) -> &dyn OverlayService {
        &*self.overlays
    }

    /// Focus host.
    #[must_use]
    pub fn focus(&self) -> &dyn FocusService {
        &*self.focus
    }

    /// Cooperative scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Identifier source.
    #[must_use]
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Menu defaults.
    #[must_use]
    pub const fn options(&self) -> &MenuDefaultOptions {
        &self.options
    }

    /// Document direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Debug for MenuEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuEnvironment")
            .field("scheduler", &self.scheduler)
            .field("options", &self.options)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
