//! Menu harness shared by the integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use popmenu_core::{
    AnimationEvent, ElementId, FocusOrigin, Key, KeyboardEvent, MenuDefaultOptions, MouseButton,
    OverlayRef,
};
use popmenu_test::{FakeOverlay, TestServices};
use popmenu_widgets::{MenuEnvironment, MenuItem, MenuPanel, MenuTrigger};

/// A root menu bound to a trigger, driven like a user would.
pub struct MenuHarness {
    pub services: TestServices,
    pub env: MenuEnvironment,
    pub anchor: ElementId,
    pub root: Rc<MenuPanel>,
    pub trigger: Rc<MenuTrigger>,
}

impl MenuHarness {
    /// Create a root menu with one item per label.
    pub fn new(labels: &[&str]) -> Self {
        Self::with_env(labels, |env| env)
    }

    /// Create a root menu, adjusting the environment first.
    pub fn with_env(labels: &[&str], configure: impl FnOnce(MenuEnvironment) -> MenuEnvironment) -> Self {
        let services = TestServices::new();
        let env = configure(
            MenuEnvironment::new(services.overlays.clone(), services.focus.clone())
                .with_scheduler(services.scheduler.clone())
                .with_ids(services.ids.clone()),
        );
        let anchor = services.element();
        let root = Self::panel_in(&env, labels);
        let trigger = MenuTrigger::new(&env, anchor);
        trigger.set_menu(Some(Rc::clone(&root))).unwrap();
        Self {
            services,
            env,
            anchor,
            root,
            trigger,
        }
    }

    /// Create a root menu with custom defaults.
    pub fn with_options(labels: &[&str], options: MenuDefaultOptions) -> Self {
        Self::with_env(labels, |env| env.with_options(options))
    }

    fn panel_in(env: &MenuEnvironment, labels: &[&str]) -> Rc<MenuPanel> {
        let items = labels.iter().map(|label| MenuItem::new(env, *label)).collect();
        MenuPanel::with_items(env, items).unwrap()
    }

    /// Create a detached panel.
    pub fn panel(&self, labels: &[&str]) -> Rc<MenuPanel> {
        Self::panel_in(&self.env, labels)
    }

    /// Item of `panel` with the given label.
    pub fn item_in(panel: &MenuPanel, label: &str) -> Rc<MenuItem> {
        panel
            .items()
            .into_iter()
            .find(|item| item.get_label() == label)
            .unwrap_or_else(|| panic!("no item labelled {label:?}"))
    }

    /// Item of the root panel with the given label.
    pub fn item(&self, label: &str) -> Rc<MenuItem> {
        Self::item_in(&self.root, label)
    }

    /// Make the item labelled `label` in `parent` open a new panel.
    pub fn submenu(&self, parent: &MenuPanel, label: &str, labels: &[&str]) -> Rc<MenuPanel> {
        let panel = self.panel(labels);
        Self::item_in(parent, label)
            .set_submenu(Some(Rc::clone(&panel)))
            .unwrap();
        panel
    }

    /// Trigger embedded in the item labelled `label` of `parent`.
    pub fn trigger_in(parent: &MenuPanel, label: &str) -> Rc<MenuTrigger> {
        Self::item_in(parent, label).submenu_trigger().unwrap()
    }

    /// Overlay created by `trigger`.
    pub fn overlay_of(&self, trigger: &MenuTrigger) -> Rc<FakeOverlay> {
        let portal_panel = trigger.menu().unwrap();
        self.services
            .overlays
            .overlays()
            .into_iter()
            .find(|overlay| {
                overlay
                    .config()
                    .position_strategy
                    .is_some_and(|strategy| strategy.origin() == trigger.anchor())
            })
            .unwrap_or_else(|| panic!("no overlay for {}", portal_panel.id()))
    }

    // === Actions ===

    /// Click the root trigger with the primary button.
    pub fn click_trigger(&self) -> &Self {
        self.trigger.handle_mousedown(MouseButton::Left, false);
        self.trigger.handle_click();
        self
    }

    /// Activate the root trigger from the keyboard.
    pub fn press_trigger(&self, key: Key) -> &Self {
        self.trigger.handle_keydown(&KeyboardEvent::new(key));
        if matches!(key, Key::Enter | Key::Space) {
            self.trigger.handle_click();
        }
        self
    }

    /// Move the pointer onto an item.
    pub fn hover(&self, item: &MenuItem) -> &Self {
        item.handle_mouse_enter();
        self
    }

    /// Click an item.
    pub fn click(&self, item: &MenuItem) -> &Self {
        item.handle_click();
        self
    }

    /// Press a key inside the overlay showing `panel`.
    pub fn press(&self, panel: &MenuPanel, key: Key) -> &Self {
        let overlay = self
            .services
            .overlays
            .showing(panel.id())
            .unwrap_or_else(|| panic!("{} is not showing", panel.id()));
        overlay.press_key(KeyboardEvent::new(key));
        self
    }

    /// Play the exit animation of `panel` to completion.
    pub fn finish_exit(&self, panel: &MenuPanel) -> &Self {
        let event = AnimationEvent::exit(panel.container());
        panel.on_animation_start(&event);
        panel.on_animation_done(&event);
        self
    }

    /// Play the enter animation of `panel` to completion.
    pub fn finish_enter(&self, panel: &MenuPanel) -> &Self {
        let event = AnimationEvent::enter(panel.container());
        panel.on_animation_start(&event);
        panel.on_animation_done(&event);
        self
    }

    /// Advance one scheduler tick.
    pub fn tick(&self) -> &Self {
        self.services.tick();
        self
    }

    /// Run every pending task.
    pub fn settle(&self) -> &Self {
        self.services.settle();
        self
    }

    // === Assertions ===

    /// Assert `trigger` has its menu open.
    pub fn assert_open(&self, trigger: &MenuTrigger) -> &Self {
        assert!(trigger.menu_open(), "expected menu on {} to be open", trigger.anchor());
        self
    }

    /// Assert `trigger` has its menu closed.
    pub fn assert_closed(&self, trigger: &MenuTrigger) -> &Self {
        assert!(!trigger.menu_open(), "expected menu on {} to be closed", trigger.anchor());
        self
    }

    /// Assert `element` has focus.
    pub fn assert_focused(&self, element: ElementId) -> &Self {
        assert_eq!(self.services.focused(), Some(element), "focus mismatch");
        self
    }

    /// Assert the most recent focus call used `origin`.
    pub fn assert_last_origin(&self, origin: Option<FocusOrigin>) -> &Self {
        let last = self.services.focus.last_focus().map(|record| record.origin);
        assert_eq!(last, Some(origin), "focus origin mismatch");
        self
    }
}
