//! Menu trigger.
//!
//! A [`MenuTrigger`] binds a [`MenuPanel`] to an anchor element. It owns the
//! overlay the panel is shown in, positions it, and turns the overlay's and
//! the panel's signals into a single open/closed state. A trigger embedded in
//! a [`MenuItem`] opens a submenu: it opens on hover and keyboard, closes with
//! its parent, and forwards click and tab closes up the chain.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};
use popmenu_core::{
    AnimationEvent, AnimationPhase, CloseReason, ConnectedPositionStrategy, Direction, ElementId,
    Emitter, EventStatus, FocusOptions, FocusOrigin, Key, KeyboardEvent, MenuError, MouseButton,
    OverlayConfig, OverlayRef, Portal, ScrollStrategy, Subscription, SubscriptionBag, TaskId,
};
use serde_json::Value;

use crate::env::MenuEnvironment;
use crate::item::MenuItem;
use crate::panel::MenuPanel;
use crate::positions::{menu_positions, position_classes, Placement};

/// Deepest submenu chain walked when computing elevation or checking for
/// cycles.
pub const MAX_MENU_DEPTH: u32 = 64;

/// Reject `candidate` as a submenu of an item in `host`.
///
/// A panel may not open itself, one of the panels it was opened from, or a
/// panel that can reach `host` again through its own submenus.
pub(crate) fn check_recursion(
    candidate: &Rc<MenuPanel>,
    host: Option<&Rc<MenuPanel>>,
) -> Result<(), MenuError> {
    let Some(host) = host else {
        return Ok(());
    };
    let recursive = || MenuError::RecursiveMenu {
        panel: candidate.id().to_string(),
    };

    let mut ancestor = Some(Rc::clone(host));
    let mut depth = 0;
    while let Some(panel) = ancestor {
        if Rc::ptr_eq(&panel, candidate) {
            return Err(recursive());
        }
        depth += 1;
        if depth > MAX_MENU_DEPTH {
            break;
        }
        ancestor = panel.parent_menu();
    }

    let mut visited = HashSet::new();
    let mut stack = vec![Rc::clone(candidate)];
    while let Some(panel) = stack.pop() {
        if !visited.insert(panel.id().to_string()) {
            continue;
        }
        for item in panel.items() {
            if let Some(submenu) = item.submenu() {
                if Rc::ptr_eq(&submenu, host) {
                    return Err(recursive());
                }
                stack.push(submenu);
            }
        }
    }
    Ok(())
}

/// Opens a menu panel in an overlay next to an anchor element.
pub struct MenuTrigger {
    weak_self: Weak<MenuTrigger>,
    env: MenuEnvironment,
    anchor: ElementId,
    item: Weak<MenuItem>,
    menu: RefCell<Option<Rc<MenuPanel>>>,
    overlay: RefCell<Option<Rc<dyn OverlayRef>>>,
    strategy: RefCell<Option<Rc<ConnectedPositionStrategy>>>,
    menu_open: Cell<bool>,
    opened_by: Cell<Option<FocusOrigin>>,
    restore_focus: Cell<bool>,
    menu_data: RefCell<Option<Value>>,
    parent_padding: Cell<Option<f32>>,
    overlay_subs: SubscriptionBag,
    closing_actions: SubscriptionBag,
    lazy_detach: SubscriptionBag,
    close_sub: RefCell<Option<Subscription>>,
    hover_sub: RefCell<Option<Subscription>>,
    items_changed_sub: RefCell<Option<Subscription>>,
    animation_wait: RefCell<Option<Subscription>>,
    pending_open: Cell<Option<TaskId>>,
    menu_opened: Emitter<()>,
    menu_closed: Emitter<()>,
    destroyed: Cell<bool>,
}

impl MenuTrigger {
    /// Create a standalone trigger anchored to `anchor`.
    pub fn new(env: &MenuEnvironment, anchor: ElementId) -> Rc<Self> {
        Self::build(env, Weak::new(), anchor)
    }

    /// Create a trigger embedded in a menu item.
    pub(crate) fn for_item(env: &MenuEnvironment, item: Weak<MenuItem>, anchor: ElementId) -> Rc<Self> {
        Self::build(env, item, anchor)
    }

    fn build(env: &MenuEnvironment, item: Weak<MenuItem>, anchor: ElementId) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            env: env.clone(),
            anchor,
            item,
            menu: RefCell::new(None),
            overlay: RefCell::new(None),
            strategy: RefCell::new(None),
            menu_open: Cell::new(false),
            opened_by: Cell::new(None),
            restore_focus: Cell::new(env.options().restore_focus),
            menu_data: RefCell::new(None),
            parent_padding: Cell::new(None),
            overlay_subs: SubscriptionBag::new(),
            closing_actions: SubscriptionBag::new(),
            lazy_detach: SubscriptionBag::new(),
            close_sub: RefCell::new(None),
            hover_sub: RefCell::new(None),
            items_changed_sub: RefCell::new(None),
            animation_wait: RefCell::new(None),
            pending_open: Cell::new(None),
            menu_opened: Emitter::new(),
            menu_closed: Emitter::new(),
            destroyed: Cell::new(false),
        })
    }

    /// Anchor element.
    #[must_use]
    pub const fn anchor(&self) -> ElementId {
        self.anchor
    }

    /// Item this trigger is embedded in.
    #[must_use]
    pub fn item(&self) -> Option<Rc<MenuItem>> {
        self.item.upgrade()
    }

    /// Panel opened by this trigger.
    #[must_use]
    pub fn menu(&self) -> Option<Rc<MenuPanel>> {
        self.menu.borrow().clone()
    }

    /// Assign the panel this trigger opens.
    ///
    /// An open menu is closed first. Fails without changing anything if the
    /// panel would contain itself.
    pub fn set_menu(&self, menu: Option<Rc<MenuPanel>>) -> Result<(), MenuError> {
        let current = self.menu();
        let same = match (&current, &menu) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return Ok(());
        }
        if let Some(candidate) = &menu {
            check_recursion(candidate, self.parent_panel().as_ref())?;
        }

        if self.menu_open.get() {
            self.destroy_menu(None);
        }
        let previous = self.close_sub.borrow_mut().take();
        drop(previous);

        *self.menu.borrow_mut() = menu.clone();
        if let Some(menu) = &menu {
            let weak = self.weak_self.clone();
            let sub = menu.closed().subscribe(move |reason| {
                if let Some(trigger) = weak.upgrade() {
                    trigger.on_menu_closed(*reason);
                }
            });
            *self.close_sub.borrow_mut() = Some(sub);
        }

        self.parent_menu_changed();
        Ok(())
    }

    /// Check if the menu is open.
    #[must_use]
    pub fn menu_open(&self) -> bool {
        self.menu_open.get()
    }

    /// How the menu was opened.
    #[must_use]
    pub fn opened_by(&self) -> Option<FocusOrigin> {
        self.opened_by.get()
    }

    /// Whether focus returns to the anchor on close.
    #[must_use]
    pub fn restore_focus(&self) -> bool {
        self.restore_focus.get()
    }

    /// Set whether focus returns to the anchor on close.
    pub fn set_restore_focus(&self, restore: bool) {
        self.restore_focus.set(restore);
    }

    /// Context passed to lazily rendered content.
    #[must_use]
    pub fn menu_data(&self) -> Option<Value> {
        self.menu_data.borrow().clone()
    }

    /// Set the context passed to lazily rendered content.
    pub fn set_menu_data(&self, data: Option<Value>) {
        *self.menu_data.borrow_mut() = data;
    }

    /// Fires when the menu opens.
    #[must_use]
    pub const fn menu_opened(&self) -> &Emitter<()> {
        &self.menu_opened
    }

    /// Fires when the menu closes.
    #[must_use]
    pub const fn menu_closed(&self) -> &Emitter<()> {
        &self.menu_closed
    }

    /// Overlay created by this trigger, if any.
    #[must_use]
    pub fn overlay(&self) -> Option<Rc<dyn OverlayRef>> {
        self.overlay.borrow().clone()
    }

    /// Check if the trigger was destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    // === Hierarchy ===

    /// Panel containing the item this trigger is embedded in.
    #[must_use]
    pub fn parent_panel(&self) -> Option<Rc<MenuPanel>> {
        self.item.upgrade()?.parent_menu()
    }

    /// Check if this trigger opens a submenu.
    #[must_use]
    pub fn triggers_submenu(&self) -> bool {
        self.menu.borrow().is_some() && self.parent_panel().is_some()
    }

    /// Trigger that has the parent panel open.
    #[must_use]
    pub fn parent_trigger(&self) -> Option<Rc<MenuTrigger>> {
        self.parent_panel()?.opener()
    }

    /// Rewire to the item's current panel.
    pub(crate) fn parent_menu_changed(&self) {
        if let Some(item) = self.item.upgrade() {
            item.mark_triggers_submenu(self.triggers_submenu());
        }
        self.parent_padding.set(None);
        self.wire_hover();
    }

    // === ARIA ===

    /// `aria-expanded` value.
    #[must_use]
    pub fn aria_expanded(&self) -> bool {
        self.menu_open.get()
    }

    /// `aria-controls` value: the panel id while open.
    #[must_use]
    pub fn aria_controls(&self) -> Option<String> {
        if !self.menu_open.get() {
            return None;
        }
        self.menu().map(|menu| menu.id().to_string())
    }

    /// `aria-haspopup` value.
    #[must_use]
    pub fn aria_haspopup(&self) -> Option<&'static str> {
        self.menu.borrow().as_ref().map(|_| "menu")
    }

    // === Open and close ===

    /// Open the menu. No-op if it is already open or there is no menu.
    pub fn open_menu(&self) {
        if self.destroyed.get() || self.menu_open.get() {
            return;
        }
        let Some(menu) = self.menu().filter(|menu| !menu.is_destroyed()) else {
            return;
        };
        let Some(me) = self.weak_self.upgrade() else {
            return;
        };

        let overlay = self.create_overlay(&menu);
        let strategy = self.strategy.borrow().clone();
        if let Some(strategy) = &strategy {
            strategy.with_positions(self.positions_for(&menu).to_vec());
        }
        overlay.set_has_backdrop(menu.has_backdrop().unwrap_or(!self.triggers_submenu()));
        overlay.set_backdrop_class(&menu.backdrop_class());
        overlay.set_panel_class(menu.overlay_panel_class());
        overlay.attach(Portal::new(menu.id(), menu.container()));

        if let Some(lazy) = menu.lazy_content() {
            let data = self.menu_data().unwrap_or(Value::Null);
            if let Err(err) = lazy.attach(&data) {
                warn!("lazy content of {} failed to attach: {err}", menu.id());
            }
        }

        self.subscribe_closing_actions(&overlay);
        self.init_menu(&me, &menu);

        if let Some(strategy) = strategy {
            let sub = menu.items_changed().subscribe(move |()| {
                strategy.reapply_last_position();
            });
            *self.items_changed_sub.borrow_mut() = Some(sub);
        }
        debug!("opened {} from {}", menu.id(), self.anchor);
    }

    /// Ask the menu to close.
    pub fn close_menu(&self) {
        if let Some(menu) = self.menu() {
            menu.emit_close(None);
        }
    }

    /// Open the menu if it is closed, close it otherwise.
    pub fn toggle_menu(&self) {
        if self.menu_open.get() {
            self.close_menu();
        } else {
            self.open_menu();
        }
    }

    /// Recompute the overlay position.
    pub fn update_position(&self) {
        let overlay = self.overlay();
        if let Some(overlay) = overlay {
            overlay.update_position();
        }
    }

    /// Focus the anchor.
    pub fn focus(&self, origin: Option<FocusOrigin>, options: FocusOptions) {
        match origin {
            Some(origin) => self.env.focus().focus_via(self.anchor, origin, options),
            None => self.env.focus().focus(self.anchor, options),
        }
    }

    fn create_overlay(&self, menu: &MenuPanel) -> Rc<dyn OverlayRef> {
        let existing = self.overlay.borrow().clone();
        if let Some(overlay) = existing {
            return overlay;
        }

        let strategy = Rc::new(
            ConnectedPositionStrategy::new(self.anchor)
                .with_locked_position(true)
                .with_grow_after_open(true)
                .with_transform_origin_on(".menu-panel"),
        );
        let config = OverlayConfig {
            position_strategy: Some(Rc::clone(&strategy)),
            has_backdrop: true,
            backdrop_class: menu.backdrop_class(),
            panel_class: menu.overlay_panel_class(),
            direction: self.env.direction(),
            scroll_strategy: ScrollStrategy::Reposition,
        };
        let overlay = self.env.overlays().create(config);

        let weak = self.weak_self.clone();
        self.overlay_subs
            .add(strategy.position_changes().subscribe(move |change| {
                let menu = weak.upgrade().and_then(|trigger| trigger.menu());
                if let Some(menu) = menu {
                    let (x, y) = position_classes(change);
                    menu.set_position_classes(x, y);
                }
            }));

        let weak = self.weak_self.clone();
        self.overlay_subs
            .add(overlay.keydown_events().subscribe(move |event| {
                let menu = weak.upgrade().and_then(|trigger| trigger.menu());
                if let Some(menu) = menu {
                    menu.handle_keydown(event);
                }
            }));

        *self.strategy.borrow_mut() = Some(strategy);
        *self.overlay.borrow_mut() = Some(Rc::clone(&overlay));
        debug!("created overlay for {}", self.anchor);
        overlay
    }

    fn positions_for(&self, menu: &MenuPanel) -> [popmenu_core::ConnectedPosition; 4] {
        let placement = if self.triggers_submenu() {
            let padding = self.parent_padding.get().unwrap_or_else(|| {
                let padding = self
                    .parent_panel()
                    .and_then(|parent| parent.items().first().map(|item| item.offset_top()))
                    .unwrap_or(0.0);
                self.parent_padding.set(Some(padding));
                padding
            });
            Placement::Submenu { padding }
        } else {
            Placement::Root {
                overlap: menu.overlap_trigger(),
            }
        };
        menu_positions(menu.x_position(), menu.y_position(), placement)
    }

    fn subscribe_closing_actions(&self, overlay: &Rc<dyn OverlayRef>) {
        fn closer<T>(weak: Weak<MenuTrigger>) -> impl Fn(&T) + 'static {
            move |_| {
                if let Some(trigger) = weak.upgrade() {
                    trigger.close_menu();
                }
            }
        }

        self.closing_actions.clear();
        self.closing_actions
            .add(overlay.backdrop_click().subscribe(closer(self.weak_self.clone())));
        self.closing_actions
            .add(overlay.detachments().subscribe(closer(self.weak_self.clone())));

        if !self.triggers_submenu() {
            return;
        }
        let Some(parent) = self.parent_panel() else {
            return;
        };
        self.closing_actions
            .add(parent.closed().subscribe(closer(self.weak_self.clone())));

        let weak = self.weak_self.clone();
        self.closing_actions
            .add(parent.hovered().subscribe(move |hovered: &Rc<MenuItem>| {
                let Some(trigger) = weak.upgrade() else {
                    return;
                };
                let own = trigger.item.upgrade().is_some_and(|item| Rc::ptr_eq(&item, hovered));
                if !own && trigger.menu_open.get() {
                    trigger.close_menu();
                }
            }));
    }

    fn init_menu(&self, me: &Rc<Self>, menu: &Rc<MenuPanel>) {
        let parent = if self.triggers_submenu() {
            self.parent_panel()
        } else {
            None
        };
        menu.set_parent_menu(parent.as_ref());
        menu.set_direction(self.env.direction());
        menu.set_opener(Some(me));
        menu.set_elevation(self.depth());
        menu.open(self.opened_by.get().unwrap_or(FocusOrigin::Program));
        self.set_is_menu_open(true);
    }

    /// Number of triggers above this one in the open chain.
    fn depth(&self) -> u32 {
        let mut depth = 0;
        let mut current = self.parent_trigger();
        while let Some(trigger) = current {
            if depth >= MAX_MENU_DEPTH {
                warn!("menu chain deeper than {MAX_MENU_DEPTH}, elevation capped");
                break;
            }
            depth += 1;
            current = trigger.parent_trigger();
        }
        depth
    }

    fn set_is_menu_open(&self, open: bool) {
        if self.menu_open.replace(open) == open {
            return;
        }
        if open {
            self.menu_opened.emit(&());
        } else {
            self.menu_closed.emit(&());
        }
        if self.triggers_submenu() {
            if let Some(item) = self.item.upgrade() {
                item.mark_highlighted(open);
            }
        }
    }

    fn on_menu_closed(&self, reason: Option<CloseReason>) {
        let was_open = self.menu_open.get();
        self.destroy_menu(reason);
        let Some(reason) = reason.filter(|reason| reason.cascades()) else {
            return;
        };
        if was_open {
            if let Some(parent) = self.parent_panel() {
                parent.emit_close(Some(reason));
            }
        }
    }

    fn destroy_menu(&self, reason: Option<CloseReason>) {
        let overlay = self.overlay();
        let Some(overlay) = overlay else {
            return;
        };
        if !self.menu_open.get() {
            return;
        }
        let menu = self.menu();

        self.cancel_pending_open();
        self.closing_actions.clear();
        let items_changed = self.items_changed_sub.borrow_mut().take();
        drop(items_changed);
        overlay.detach();

        let opened_by = self.opened_by.get();
        if self.restore_focus.get()
            && (reason == Some(CloseReason::Keydown)
                || opened_by.is_none()
                || !self.triggers_submenu())
        {
            self.focus(
                Some(opened_by.unwrap_or(FocusOrigin::Program)),
                FocusOptions::default(),
            );
        }
        self.opened_by.set(None);

        if let Some(menu) = &menu {
            menu.reset_animation();
            if let Some(lazy) = menu.lazy_content() {
                self.detach_lazy_after_exit(menu, &lazy);
            }
            debug!("closed {} ({reason:?})", menu.id());
        }
        self.set_is_menu_open(false);
    }

    fn detach_lazy_after_exit(&self, menu: &MenuPanel, lazy: &Rc<crate::content::LazyMenuContent>) {
        self.lazy_detach.clear();

        let weak_self = self.weak_self.clone();
        let weak_lazy = Rc::downgrade(lazy);
        self.lazy_detach
            .add(menu.animation_done().subscribe(move |event: &AnimationEvent| {
                if event.to_state != AnimationPhase::Void {
                    return;
                }
                if let Some(trigger) = weak_self.upgrade() {
                    trigger.lazy_detach.clear();
                }
                if let Some(lazy) = weak_lazy.upgrade() {
                    lazy.detach();
                }
            }));

        // Re-attaching before the exit finishes keeps the new content.
        let weak_self = self.weak_self.clone();
        self.lazy_detach.add(lazy.attached().subscribe(move |()| {
            if let Some(trigger) = weak_self.upgrade() {
                trigger.lazy_detach.clear();
            }
        }));
    }

    // === Hover ===

    fn wire_hover(&self) {
        let previous = self.hover_sub.borrow_mut().take();
        drop(previous);
        if !self.triggers_submenu() {
            return;
        }
        let Some(parent) = self.parent_panel() else {
            return;
        };
        let weak = self.weak_self.clone();
        let sub = parent.hovered().subscribe(move |hovered| {
            if let Some(trigger) = weak.upgrade() {
                trigger.on_parent_hovered(hovered);
            }
        });
        *self.hover_sub.borrow_mut() = Some(sub);
    }

    fn on_parent_hovered(&self, hovered: &Rc<MenuItem>) {
        self.cancel_pending_open();
        let own = self.item.upgrade().filter(|item| Rc::ptr_eq(item, hovered));
        let Some(item) = own else {
            return;
        };
        if item.is_disabled() || self.destroyed.get() {
            return;
        }

        let weak = self.weak_self.clone();
        let id = self.env.scheduler().schedule(move || {
            if let Some(trigger) = weak.upgrade() {
                trigger.pending_open.set(None);
                trigger.open_from_hover();
            }
        });
        self.pending_open.set(Some(id));
        trace!("submenu open scheduled for {}", self.anchor);
    }

    fn open_from_hover(&self) {
        self.opened_by.set(Some(FocusOrigin::Mouse));
        let Some(menu) = self.menu() else {
            return;
        };
        if !menu.is_animating() {
            self.open_menu();
            return;
        }

        trace!("{} is animating, waiting before open", menu.id());
        let weak = self.weak_self.clone();
        let wait = menu.animation_done().subscribe_once(move |_| {
            let Some(trigger) = weak.upgrade() else {
                return;
            };
            let weak = Rc::downgrade(&trigger);
            let id = trigger.env.scheduler().schedule(move || {
                if let Some(trigger) = weak.upgrade() {
                    trigger.pending_open.set(None);
                    trigger.open_menu();
                }
            });
            trigger.pending_open.set(Some(id));
        });
        *self.animation_wait.borrow_mut() = Some(wait);
    }

    fn cancel_pending_open(&self) {
        if let Some(id) = self.pending_open.take() {
            self.env.scheduler().cancel(id);
            trace!("pending submenu open cancelled for {}", self.anchor);
        }
        let wait = self.animation_wait.borrow_mut().take();
        drop(wait);
    }

    // === Host events ===

    /// Anchor was clicked.
    ///
    /// Submenu launchers only open; the click must not reach the parent
    /// panel, which would close it.
    pub fn handle_click(&self) -> EventStatus {
        if self.triggers_submenu() {
            self.open_menu();
            EventStatus::Captured
        } else {
            self.toggle_menu();
            EventStatus::Ignored
        }
    }

    /// Mouse button pressed on the anchor. Synthetic presses from screen
    /// readers keep the previous origin.
    pub fn handle_mousedown(&self, button: MouseButton, synthetic: bool) -> EventStatus {
        if synthetic {
            return EventStatus::Ignored;
        }
        self.opened_by.set((button == MouseButton::Left).then_some(FocusOrigin::Mouse));
        if self.triggers_submenu() {
            EventStatus::Captured
        } else {
            EventStatus::Ignored
        }
    }

    /// Touch started on the anchor.
    pub fn handle_touchstart(&self, synthetic: bool) {
        if !synthetic {
            self.opened_by.set(Some(FocusOrigin::Touch));
        }
    }

    /// Key pressed while the anchor has focus.
    pub fn handle_keydown(&self, event: &KeyboardEvent) -> EventStatus {
        match event.key {
            Key::Enter | Key::Space => {
                self.opened_by.set(Some(FocusOrigin::Keyboard));
                EventStatus::Ignored
            }
            Key::Right | Key::Left if self.triggers_submenu() => {
                let rtl = self.env.direction() == Direction::Rtl;
                let opens = (event.key == Key::Right) != rtl;
                if !opens {
                    return EventStatus::Ignored;
                }
                self.opened_by.set(Some(FocusOrigin::Keyboard));
                self.open_menu();
                EventStatus::Captured
            }
            _ => EventStatus::Ignored,
        }
    }

    // === Teardown ===

    /// Dispose the overlay and drop every subscription. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.cancel_pending_open();
        self.closing_actions.clear();
        self.overlay_subs.clear();
        self.lazy_detach.clear();
        for slot in [&self.close_sub, &self.hover_sub, &self.items_changed_sub] {
            let sub = slot.borrow_mut().take();
            drop(sub);
        }

        let overlay = self.overlay.borrow_mut().take();
        *self.strategy.borrow_mut() = None;
        if let Some(overlay) = overlay {
            overlay.dispose();
        }

        if self.menu_open.get() {
            if let Some(menu) = self.menu() {
                menu.reset_animation();
                if let Some(lazy) = menu.lazy_content() {
                    lazy.detach();
                }
            }
        }
        self.set_is_menu_open(false);
        self.opened_by.set(None);
        self.menu_opened.complete();
        self.menu_closed.complete();
        debug!("trigger on {} destroyed", self.anchor);
    }
}

impl fmt::Debug for MenuTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuTrigger")
            .field("anchor", &self.anchor)
            .field("menu", &self.menu.borrow().as_ref().map(|m| m.id().to_string()))
            .field("menu_open", &self.menu_open.get())
            .field("opened_by", &self.opened_by.get())
            .field("destroyed", &self.destroyed.get())
            .finish_non_exhaustive()
    }
}
