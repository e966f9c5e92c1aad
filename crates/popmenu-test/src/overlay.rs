//! In-memory overlay host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::trace;
use popmenu_core::{
    Emitter, KeyboardEvent, OverlayConfig, OverlayRef, OverlayService, Portal,
};

/// Overlay that records what a menu does to it.
///
/// Attaching applies the first candidate position of the configured
/// strategy, the way a host with unlimited viewport space would.
pub struct FakeOverlay {
    config: RefCell<OverlayConfig>,
    portal: RefCell<Option<Portal>>,
    attach_count: Cell<usize>,
    detach_count: Cell<usize>,
    dispose_count: Cell<usize>,
    position_updates: Cell<usize>,
    backdrop_click: Emitter<()>,
    detachments: Emitter<()>,
    keydown_events: Emitter<KeyboardEvent>,
}

impl FakeOverlay {
    /// Create a detached overlay.
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config: RefCell::new(config),
            portal: RefCell::new(None),
            attach_count: Cell::new(0),
            detach_count: Cell::new(0),
            dispose_count: Cell::new(0),
            position_updates: Cell::new(0),
            backdrop_click: Emitter::new(),
            detachments: Emitter::new(),
            keydown_events: Emitter::new(),
        }
    }

    /// Simulate a click on the backdrop.
    pub fn click_backdrop(&self) {
        self.backdrop_click.emit(&());
    }

    /// Simulate a key press dispatched to the overlay.
    pub fn press_key(&self, event: KeyboardEvent) {
        self.keydown_events.emit(&event);
    }

    /// Portal currently attached.
    #[must_use]
    pub fn portal(&self) -> Option<Portal> {
        self.portal.borrow().clone()
    }

    /// Number of attach calls.
    #[must_use]
    pub fn attach_count(&self) -> usize {
        self.attach_count.get()
    }

    /// Number of detach calls that removed content.
    #[must_use]
    pub fn detach_count(&self) -> usize {
        self.detach_count.get()
    }

    /// Number of dispose calls.
    #[must_use]
    pub fn dispose_count(&self) -> usize {
        self.dispose_count.get()
    }

    /// Number of explicit position updates.
    #[must_use]
    pub fn position_updates(&self) -> usize {
        self.position_updates.get()
    }

    /// Check if the overlay was disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.dispose_count.get() > 0
    }
}

impl OverlayRef for FakeOverlay {
    fn attach(&self, portal: Portal) {
        trace!("fake overlay attach {}", portal.panel_id);
        *self.portal.borrow_mut() = Some(portal);
        self.attach_count.set(self.attach_count.get() + 1);

        let strategy = self.config.borrow().position_strategy.clone();
        if let Some(strategy) = strategy {
            strategy.attach();
            strategy.apply_first_fit(|_| true);
        }
    }

    fn detach(&self) {
        let had_portal = self.portal.borrow_mut().take().is_some();
        if had_portal {
            self.detach_count.set(self.detach_count.get() + 1);
            self.detachments.emit(&());
        }
    }

    fn dispose(&self) {
        self.detach();
        self.dispose_count.set(self.dispose_count.get() + 1);
        self.backdrop_click.complete();
        self.detachments.complete();
        self.keydown_events.complete();
    }

    fn has_attached(&self) -> bool {
        self.portal.borrow().is_some()
    }

    fn backdrop_click(&self) -> Emitter<()> {
        self.backdrop_click.clone()
    }

    fn detachments(&self) -> Emitter<()> {
        self.detachments.clone()
    }

    fn keydown_events(&self) -> Emitter<KeyboardEvent> {
        self.keydown_events.clone()
    }

    fn config(&self) -> OverlayConfig {
        self.config.borrow().clone()
    }

    fn set_has_backdrop(&self, has_backdrop: bool) {
        self.config.borrow_mut().has_backdrop = has_backdrop;
    }

    fn set_backdrop_class(&self, class: &str) {
        self.config.borrow_mut().backdrop_class = class.to_string();
    }

    fn set_panel_class(&self, classes: Vec<String>) {
        self.config.borrow_mut().panel_class = classes;
    }

    fn update_position(&self) {
        self.position_updates.set(self.position_updates.get() + 1);
        let strategy = self.config.borrow().position_strategy.clone();
        if let Some(strategy) = strategy {
            strategy.apply_first_fit(|_| true);
        }
    }
}

/// Overlay service handing out [`FakeOverlay`]s.
#[derive(Default)]
pub struct FakeOverlayService {
    created: RefCell<Vec<Rc<FakeOverlay>>>,
}

impl FakeOverlayService {
    /// Create a service with no overlays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of overlays created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.borrow().len()
    }

    /// Every overlay created, in creation order.
    #[must_use]
    pub fn overlays(&self) -> Vec<Rc<FakeOverlay>> {
        self.created.borrow().clone()
    }

    /// Most recently created overlay.
    #[must_use]
    pub fn last(&self) -> Option<Rc<FakeOverlay>> {
        self.created.borrow().last().cloned()
    }

    /// Overlay currently showing the given panel.
    #[must_use]
    pub fn showing(&self, panel_id: &str) -> Option<Rc<FakeOverlay>> {
        self.created
            .borrow()
            .iter()
            .find(|overlay| {
                overlay
                    .portal()
                    .is_some_and(|portal| portal.panel_id == panel_id)
            })
            .cloned()
    }
}

impl OverlayService for FakeOverlayService {
    fn create(&self, config: OverlayConfig) -> Rc<dyn OverlayRef> {
        let overlay = Rc::new(FakeOverlay::new(config));
        self.created.borrow_mut().push(Rc::clone(&overlay));
        overlay
    }
}
