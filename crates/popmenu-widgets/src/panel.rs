//! Menu panel widget.
//!
//! A [`MenuPanel`] is the popup surface of a menu. It owns its items and the
//! keyboard focus manager that moves between them, tracks the open/close
//! animation, and announces close requests on [`MenuPanel::closed`]. The
//! panel never opens itself; a [`MenuTrigger`](crate::MenuTrigger) attaches
//! it to an overlay and reacts to its close requests.
//!
//! State machine: `Void -> Entering -> Entered -> Void`. Leaving `Entered`
//! happens when a trigger resets the animation; lazily rendered content is
//! only removed once the exit animation reports completion.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, trace};
use popmenu_core::{
    AnimationEvent, AnimationPhase, AnimationState, CloseReason, Direction, ElementId, Emitter,
    EventStatus, FocusKeyManager, FocusOptions, FocusOrigin, Key, KeyManagerAction,
    KeyboardEvent, MenuError, SubscriptionBag, TaskId, XPosition, YPosition, MAX_ELEVATION,
};

use crate::content::LazyMenuContent;
use crate::env::MenuEnvironment;
use crate::item::MenuItem;
use crate::trigger::{check_recursion, MenuTrigger};

/// Prefix of the elevation class.
pub const ELEVATION_PREFIX: &str = "menu-elevation-z";

/// The popup surface of a menu.
pub struct MenuPanel {
    weak_self: Weak<MenuPanel>,
    env: MenuEnvironment,
    id: String,
    container: ElementId,
    items: RefCell<Vec<Rc<MenuItem>>>,
    item_relays: SubscriptionBag,
    key_manager: RefCell<FocusKeyManager>,
    animation_state: Cell<AnimationState>,
    is_animating: Cell<bool>,
    elevation_depth: Cell<u32>,
    parent: RefCell<Weak<MenuPanel>>,
    opener: RefCell<Weak<MenuTrigger>>,
    x_position: Cell<XPosition>,
    y_position: Cell<YPosition>,
    overlap_trigger: Cell<bool>,
    has_backdrop: Cell<Option<bool>>,
    backdrop_class: RefCell<String>,
    overlay_panel_class: RefCell<Vec<String>>,
    base_elevation: Cell<u32>,
    classes: RefCell<Vec<String>>,
    panel_class: RefCell<Vec<String>>,
    previous_elevation: RefCell<Option<String>>,
    direction: Cell<Direction>,
    aria_label: RefCell<Option<String>>,
    aria_labelledby: RefCell<Option<String>>,
    aria_describedby: RefCell<Option<String>>,
    scroll_top: Cell<f32>,
    lazy_content: RefCell<Option<Rc<LazyMenuContent>>>,
    hovered: Emitter<Rc<MenuItem>>,
    closed: Emitter<Option<CloseReason>>,
    items_changed: Emitter<()>,
    animation_done: Emitter<AnimationEvent>,
    animation_state_changes: Emitter<AnimationState>,
    pending_focus: Cell<Option<TaskId>>,
    pending_tab_index: Cell<Option<TaskId>>,
    pending_type_ahead: Cell<Option<TaskId>>,
    destroyed: Cell<bool>,
}

impl MenuPanel {
    /// Create an empty panel using the environment's defaults.
    pub fn new(env: &MenuEnvironment) -> Rc<Self> {
        let options = env.options().clone();
        let panel = Rc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            id: env.ids().next_panel_id(),
            container: env.ids().next_element_id(),
            items: RefCell::new(Vec::new()),
            item_relays: SubscriptionBag::new(),
            key_manager: RefCell::new(
                FocusKeyManager::new()
                    .with_wrap(true)
                    .with_home_and_end(true)
                    .with_type_ahead(true),
            ),
            animation_state: Cell::new(AnimationState::Void),
            is_animating: Cell::new(false),
            elevation_depth: Cell::new(0),
            parent: RefCell::new(Weak::new()),
            opener: RefCell::new(Weak::new()),
            x_position: Cell::new(options.x_position),
            y_position: Cell::new(options.y_position),
            overlap_trigger: Cell::new(options.overlap_trigger),
            has_backdrop: Cell::new(options.has_backdrop),
            backdrop_class: RefCell::new(options.backdrop_class),
            overlay_panel_class: RefCell::new(options.overlay_panel_class),
            base_elevation: Cell::new(options.base_elevation),
            classes: RefCell::new(Vec::new()),
            panel_class: RefCell::new(Vec::new()),
            previous_elevation: RefCell::new(None),
            direction: Cell::new(env.direction()),
            aria_label: RefCell::new(None),
            aria_labelledby: RefCell::new(None),
            aria_describedby: RefCell::new(None),
            scroll_top: Cell::new(0.0),
            lazy_content: RefCell::new(None),
            hovered: Emitter::new(),
            closed: Emitter::new(),
            items_changed: Emitter::new(),
            animation_done: Emitter::new(),
            animation_state_changes: Emitter::new(),
            pending_focus: Cell::new(None),
            pending_tab_index: Cell::new(None),
            pending_type_ahead: Cell::new(None),
            destroyed: Cell::new(false),
            env: env.clone(),
        });
        panel.set_position_classes(options.x_position, options.y_position);
        panel
    }

    /// Create a panel holding `items`.
    pub fn with_items(env: &MenuEnvironment, items: Vec<Rc<MenuItem>>) -> Result<Rc<Self>, MenuError> {
        let panel = Self::new(env);
        panel.set_items(items)?;
        Ok(panel)
    }

    // === Identity ===

    /// Panel id, unique per environment.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Container element of the panel.
    #[must_use]
    pub const fn container(&self) -> ElementId {
        self.container
    }

    /// Check if the panel was destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    // === Options ===

    /// Horizontal side the panel opens toward.
    #[must_use]
    pub fn x_position(&self) -> XPosition {
        self.x_position.get()
    }

    /// Set the horizontal side.
    pub fn set_x_position(&self, x: XPosition) {
        self.x_position.set(x);
        self.set_position_classes(x, self.y_position.get());
    }

    /// Vertical side the panel opens toward.
    #[must_use]
    pub fn y_position(&self) -> YPosition {
        self.y_position.get()
    }

    /// Set the vertical side.
    pub fn set_y_position(&self, y: YPosition) {
        self.y_position.set(y);
        self.set_position_classes(self.x_position.get(), y);
    }

    /// Whether the panel covers its trigger.
    #[must_use]
    pub fn overlap_trigger(&self) -> bool {
        self.overlap_trigger.get()
    }

    /// Set trigger overlap.
    pub fn set_overlap_trigger(&self, overlap: bool) {
        self.overlap_trigger.set(overlap);
    }

    /// Backdrop override.
    #[must_use]
    pub fn has_backdrop(&self) -> Option<bool> {
        self.has_backdrop.get()
    }

    /// Force the backdrop on or off, or let the trigger decide with `None`.
    pub fn set_has_backdrop(&self, has_backdrop: Option<bool>) {
        self.has_backdrop.set(has_backdrop);
    }

    /// Backdrop class.
    #[must_use]
    pub fn backdrop_class(&self) -> String {
        self.backdrop_class.borrow().clone()
    }

    /// Set the backdrop class.
    pub fn set_backdrop_class(&self, class: impl Into<String>) {
        *self.backdrop_class.borrow_mut() = class.into();
    }

    /// Classes for the overlay pane.
    #[must_use]
    pub fn overlay_panel_class(&self) -> Vec<String> {
        self.overlay_panel_class.borrow().clone()
    }

    /// Set classes for the overlay pane.
    pub fn set_overlay_panel_class(&self, classes: Vec<String>) {
        *self.overlay_panel_class.borrow_mut() = classes;
    }

    /// Elevation of the panel at depth zero.
    #[must_use]
    pub fn base_elevation(&self) -> u32 {
        self.base_elevation.get()
    }

    /// Set the elevation at depth zero.
    pub fn set_base_elevation(&self, base: u32) {
        self.base_elevation.set(base);
    }

    /// Layout direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction.get()
    }

    /// Set the layout direction.
    pub fn set_direction(&self, direction: Direction) {
        self.direction.set(direction);
    }

    /// `aria-label` value.
    #[must_use]
    pub fn aria_label(&self) -> Option<String> {
        self.aria_label.borrow().clone()
    }

    /// Set `aria-label`.
    pub fn set_aria_label(&self, label: Option<String>) {
        *self.aria_label.borrow_mut() = label;
    }

    /// `aria-labelledby` value.
    #[must_use]
    pub fn aria_labelledby(&self) -> Option<String> {
        self.aria_labelledby.borrow().clone()
    }

    /// Set `aria-labelledby`.
    pub fn set_aria_labelledby(&self, id: Option<String>) {
        *self.aria_labelledby.borrow_mut() = id;
    }

    /// `aria-describedby` value.
    #[must_use]
    pub fn aria_describedby(&self) -> Option<String> {
        self.aria_describedby.borrow().clone()
    }

    /// Set `aria-describedby`.
    pub fn set_aria_describedby(&self, id: Option<String>) {
        *self.aria_describedby.borrow_mut() = id;
    }

    // === Classes ===

    /// Classes on the panel container.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }

    /// Check if the panel container has a class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn toggle_class(&self, class: &str, on: bool) {
        let mut classes = self.classes.borrow_mut();
        let present = classes.iter().position(|c| c == class);
        match (present, on) {
            (None, true) => classes.push(class.to_string()),
            (Some(index), false) => {
                classes.remove(index);
            }
            _ => {}
        }
    }

    /// Replace the host-supplied classes with a space-separated list.
    pub fn set_panel_class(&self, classes: &str) {
        let previous = std::mem::take(&mut *self.panel_class.borrow_mut());
        for class in &previous {
            self.toggle_class(class, false);
        }
        let next: Vec<String> = classes.split_whitespace().map(str::to_string).collect();
        for class in &next {
            self.toggle_class(class, true);
        }
        *self.panel_class.borrow_mut() = next;
    }

    /// Apply the classes describing which side the panel opened on.
    pub fn set_position_classes(&self, x: XPosition, y: YPosition) {
        self.toggle_class("menu-before", x == XPosition::Before);
        self.toggle_class("menu-after", x == XPosition::After);
        self.toggle_class("menu-above", y == YPosition::Above);
        self.toggle_class("menu-below", y == YPosition::Below);
    }

    /// Apply the elevation class for a nesting depth.
    ///
    /// A host-supplied elevation class takes precedence and is left alone.
    pub fn set_elevation(&self, depth: u32) {
        self.elevation_depth.set(depth);
        let level = self.base_elevation.get().saturating_add(depth).min(MAX_ELEVATION);
        let next = format!("{ELEVATION_PREFIX}{level}");

        let custom = self
            .classes
            .borrow()
            .iter()
            .find(|c| c.starts_with(ELEVATION_PREFIX))
            .cloned();
        let previous = self.previous_elevation.borrow().clone();

        if custom.is_none() || custom == previous {
            if let Some(previous) = previous {
                self.toggle_class(&previous, false);
            }
            self.toggle_class(&next, true);
            *self.previous_elevation.borrow_mut() = Some(next);
        }
    }

    /// Nesting depth recorded by the last [`MenuPanel::set_elevation`].
    #[must_use]
    pub fn elevation_depth(&self) -> u32 {
        self.elevation_depth.get()
    }

    // === Hierarchy ===

    /// Panel this one was opened from.
    #[must_use]
    pub fn parent_menu(&self) -> Option<Rc<MenuPanel>> {
        self.parent.borrow().upgrade()
    }

    /// Set the panel this one was opened from.
    pub fn set_parent_menu(&self, parent: Option<&Rc<MenuPanel>>) {
        *self.parent.borrow_mut() = parent.map_or_else(Weak::new, Rc::downgrade);
    }

    /// Trigger that last opened this panel.
    #[must_use]
    pub fn opener(&self) -> Option<Rc<MenuTrigger>> {
        self.opener.borrow().upgrade()
    }

    pub(crate) fn set_opener(&self, trigger: Option<&Rc<MenuTrigger>>) {
        *self.opener.borrow_mut() = trigger.map_or_else(Weak::new, Rc::downgrade);
    }

    /// Lazily rendered content, if any.
    #[must_use]
    pub fn lazy_content(&self) -> Option<Rc<LazyMenuContent>> {
        self.lazy_content.borrow().clone()
    }

    /// Render the panel's items lazily from `content`.
    pub fn set_lazy_content(&self, content: Option<Rc<LazyMenuContent>>) {
        if let Some(content) = &content {
            content.set_panel(&self.weak_self);
        }
        let previous = std::mem::replace(&mut *self.lazy_content.borrow_mut(), content);
        if let Some(previous) = previous {
            previous.detach();
        }
    }

    // === Items ===

    /// Items in document order.
    #[must_use]
    pub fn items(&self) -> Vec<Rc<MenuItem>> {
        self.items.borrow().clone()
    }

    /// Number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.borrow().len()
    }

    /// Replace the items.
    ///
    /// Fails without changing anything if one of the items opens a submenu
    /// that contains this panel.
    pub fn set_items(&self, items: Vec<Rc<MenuItem>>) -> Result<(), MenuError> {
        let Some(me) = self.weak_self.upgrade() else {
            return Ok(());
        };
        for item in &items {
            if let Some(submenu) = item.submenu() {
                check_recursion(&submenu, Some(&me))?;
            }
        }
        self.replace_items(&me, items);
        Ok(())
    }

    /// Replace the items with a subset of the current ones.
    pub(crate) fn set_items_unchecked(&self, items: Vec<Rc<MenuItem>>) {
        if let Some(me) = self.weak_self.upgrade() {
            self.replace_items(&me, items);
        }
    }

    fn replace_items(&self, me: &Rc<Self>, items: Vec<Rc<MenuItem>>) {
        let previous_active = self.active_item();
        let previous_index = self.active_index();
        let old = std::mem::replace(&mut *self.items.borrow_mut(), items);
        let items = self.items();

        for item in &old {
            let still_here = items.iter().any(|it| Rc::ptr_eq(it, item));
            let ours = item.parent_menu().is_some_and(|p| Rc::ptr_eq(&p, me));
            if !still_here && ours {
                item.set_parent_menu(None);
            }
        }

        self.wire_items(&items);
        for item in &items {
            item.set_parent_menu(Some(me));
        }

        self.reconcile_active(previous_active, previous_index);
        self.schedule_tab_index_update();
        trace!("{} now has {} items", self.id, items.len());
        self.items_changed.emit(&());
    }

    /// Append an item.
    pub fn add_item(&self, item: Rc<MenuItem>) -> Result<(), MenuError> {
        let mut items = self.items();
        items.push(item);
        self.set_items(items)
    }

    /// Remove an item. Returns `false` if it was not in the panel.
    pub fn remove_item(&self, item: &Rc<MenuItem>) -> bool {
        let mut items = self.items();
        let before = items.len();
        items.retain(|it| !Rc::ptr_eq(it, item));
        if items.len() == before {
            return false;
        }
        self.set_items_unchecked(items);
        true
    }

    fn wire_items(&self, items: &[Rc<MenuItem>]) {
        self.item_relays.clear();
        for item in items {
            let weak = self.weak_self.clone();
            self.item_relays.add(item.hovered().subscribe(move |hovered| {
                if let Some(panel) = weak.upgrade() {
                    panel.hovered.emit(hovered);
                }
            }));

            let weak = self.weak_self.clone();
            self.item_relays.add(item.focused().subscribe(move |focused| {
                if let Some(panel) = weak.upgrade() {
                    panel.item_focused(focused);
                }
            }));
        }
    }

    fn item_focused(&self, item: &Rc<MenuItem>) {
        let index = self.items.borrow().iter().position(|it| Rc::ptr_eq(it, item));
        if index.is_some() {
            self.key_manager.borrow_mut().update_active_item(index);
            self.schedule_tab_index_update();
        }
    }

    fn reconcile_active(&self, previous: Option<Rc<MenuItem>>, previous_index: Option<usize>) {
        let items = self.items();
        let Some(previous) = previous else {
            self.key_manager.borrow_mut().reset_active_item();
            return;
        };

        if let Some(index) = items.iter().position(|it| Rc::ptr_eq(it, &previous)) {
            self.key_manager.borrow_mut().update_active_item(Some(index));
            return;
        }

        // The active item went away. Keep focus inside an open panel.
        self.key_manager.borrow_mut().reset_active_item();
        let open = self.animation_state.get() != AnimationState::Void;
        if !open || !previous.has_focus() || items.is_empty() {
            return;
        }
        let index = previous_index.unwrap_or(0).min(items.len() - 1);
        let next = {
            let mut manager = self.key_manager.borrow_mut();
            manager
                .set_active_item(&items, index)
                .or_else(|| manager.set_next_item_active(&items))
        };
        if let Some(next) = next {
            let origin = self.key_manager.borrow().focus_origin();
            items[next].focus(Some(origin), FocusOptions::default());
        }
    }

    /// Item the keyboard manager considers active.
    #[must_use]
    pub fn active_item(&self) -> Option<Rc<MenuItem>> {
        let index = self.key_manager.borrow().active_index()?;
        self.items.borrow().get(index).cloned()
    }

    /// Index of the active item.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.key_manager.borrow().active_index()
    }

    /// Clear the active item so the next arrow key starts fresh.
    pub fn reset_active_item(&self) {
        self.key_manager.borrow_mut().reset_active_item();
    }

    /// Typed characters pending for type-ahead.
    #[must_use]
    pub fn type_ahead_buffer(&self) -> String {
        self.key_manager.borrow().type_ahead_buffer().to_string()
    }

    // === Channels ===

    /// Relay of items under the pointer.
    #[must_use]
    pub const fn hovered(&self) -> &Emitter<Rc<MenuItem>> {
        &self.hovered
    }

    /// Close requests, with the reason if known.
    #[must_use]
    pub const fn closed(&self) -> &Emitter<Option<CloseReason>> {
        &self.closed
    }

    /// Fires after the item list changes.
    #[must_use]
    pub const fn items_changed(&self) -> &Emitter<()> {
        &self.items_changed
    }

    /// Completed transitions.
    #[must_use]
    pub const fn animation_done(&self) -> &Emitter<AnimationEvent> {
        &self.animation_done
    }

    /// State changes the animation engine should play.
    #[must_use]
    pub const fn animation_state_changes(&self) -> &Emitter<AnimationState> {
        &self.animation_state_changes
    }

    /// Ask whoever opened the panel to close it.
    pub fn emit_close(&self, reason: Option<CloseReason>) {
        if self.destroyed.get() {
            return;
        }
        debug!("{} close requested ({reason:?})", self.id);
        self.closed.emit(&reason);
    }

    /// A click anywhere inside the panel closes it.
    pub fn handle_click(&self) -> EventStatus {
        self.emit_close(Some(CloseReason::Click));
        EventStatus::Captured
    }

    // === Opening and focus ===

    /// Start the enter transition and focus the first item.
    pub fn open(&self, origin: FocusOrigin) {
        if self.destroyed.get() {
            return;
        }
        self.reset_active_item();
        self.start_animation();
        self.focus_first_item(origin);
    }

    /// Focus the first enabled item once rendering is stable.
    ///
    /// A second call before then replaces the first. If focus is already
    /// inside the panel nothing moves. With every item disabled the panel
    /// container takes focus instead.
    pub fn focus_first_item(&self, origin: FocusOrigin) {
        let scheduler = self.env.scheduler();
        if let Some(pending) = self.pending_focus.take() {
            scheduler.cancel(pending);
        }
        let weak = self.weak_self.clone();
        let id = scheduler.on_stable(move || {
            if let Some(panel) = weak.upgrade() {
                panel.pending_focus.set(None);
                panel.run_focus_first_item(origin);
            }
        });
        self.pending_focus.set(Some(id));
    }

    fn run_focus_first_item(&self, origin: FocusOrigin) {
        if self.destroyed.get() {
            return;
        }
        let items = self.items();
        let Some(first) = items.first() else {
            return;
        };
        let root = first
            .parent_menu()
            .map_or(self.container, |panel| panel.container());

        let focused = self.env.focus().focused_element();
        let inside = focused == Some(root) || items.iter().any(|it| Some(it.host()) == focused);
        if inside {
            return;
        }

        let index = {
            let mut manager = self.key_manager.borrow_mut();
            manager.set_focus_origin(origin);
            manager.set_first_item_active(&items)
        };
        match index {
            Some(index) => items[index].focus(Some(origin), FocusOptions::default()),
            None => self.env.focus().focus(root, FocusOptions::default()),
        }
    }

    // === Keyboard ===

    /// Route a key press that reached the panel.
    pub fn handle_keydown(&self, event: &KeyboardEvent) -> EventStatus {
        if self.destroyed.get() {
            return EventStatus::Ignored;
        }

        let active = self.active_item();
        if let Some(trigger) = active.as_ref().and_then(|item| item.submenu_trigger()) {
            if trigger.handle_keydown(event).is_captured() {
                return EventStatus::Captured;
            }
        }

        let has_parent = self.parent_menu().is_some();
        match event.key {
            Key::Escape => {
                if !event.has_modifier() {
                    self.emit_close(Some(CloseReason::Keydown));
                }
                EventStatus::Captured
            }
            Key::Left => {
                if has_parent && self.direction.get() == Direction::Ltr {
                    self.emit_close(Some(CloseReason::Keydown));
                }
                EventStatus::Captured
            }
            Key::Right => {
                if has_parent && self.direction.get() == Direction::Rtl {
                    self.emit_close(Some(CloseReason::Keydown));
                }
                EventStatus::Captured
            }
            Key::Enter | Key::Space if !event.has_modifier() => match active {
                Some(item) => {
                    item.handle_click();
                    EventStatus::Captured
                }
                None => EventStatus::Ignored,
            },
            key => {
                if matches!(key, Key::Up | Key::Down) {
                    self.key_manager
                        .borrow_mut()
                        .set_focus_origin(FocusOrigin::Keyboard);
                }
                self.delegate_to_key_manager(event)
            }
        }
    }

    fn delegate_to_key_manager(&self, event: &KeyboardEvent) -> EventStatus {
        let items = self.items();
        let action = self.key_manager.borrow_mut().on_keydown(event, &items);

        if action.is_handled() && event.key.to_char().is_some() {
            self.schedule_type_ahead_clear();
        }

        match action {
            KeyManagerAction::ActiveChanged(index) => {
                let origin = self.key_manager.borrow().focus_origin();
                items[index].focus(Some(origin), FocusOptions::default());
                EventStatus::Captured
            }
            KeyManagerAction::Handled => EventStatus::Captured,
            KeyManagerAction::TabOut => {
                self.emit_close(Some(CloseReason::Tab));
                EventStatus::Ignored
            }
            KeyManagerAction::Unhandled => EventStatus::Ignored,
        }
    }

    fn schedule_type_ahead_clear(&self) {
        let scheduler = self.env.scheduler();
        if let Some(pending) = self.pending_type_ahead.take() {
            scheduler.cancel(pending);
        }
        let weak = self.weak_self.clone();
        let id = scheduler.schedule(move || {
            if let Some(panel) = weak.upgrade() {
                panel.pending_type_ahead.set(None);
                panel.key_manager.borrow_mut().clear_type_ahead();
            }
        });
        self.pending_type_ahead.set(Some(id));
    }

    // === Tab index ===

    fn schedule_tab_index_update(&self) {
        if self.pending_tab_index.get().is_some() {
            return;
        }
        let weak = self.weak_self.clone();
        let id = self.env.scheduler().on_stable(move || {
            let Some(panel) = weak.upgrade() else {
                return;
            };
            let weak = Rc::downgrade(&panel);
            let micro = panel.env.scheduler().microtask(move || {
                if let Some(panel) = weak.upgrade() {
                    panel.pending_tab_index.set(None);
                    panel.update_tab_indices();
                }
            });
            panel.pending_tab_index.set(Some(micro));
        });
        self.pending_tab_index.set(Some(id));
    }

    fn update_tab_indices(&self) {
        let items = self.items();
        let active = self
            .active_index()
            .filter(|&index| items.get(index).is_some_and(|it| !it.is_disabled()));
        let target = active.or_else(|| items.iter().position(|it| !it.is_disabled()));
        for (index, item) in items.iter().enumerate() {
            item.set_tab_index(if Some(index) == target { 0 } else { -1 });
        }
    }

    // === Animation ===

    /// Current transition state.
    #[must_use]
    pub fn animation_state(&self) -> AnimationState {
        self.animation_state.get()
    }

    /// Check if a transition is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.is_animating.get()
    }

    fn set_animation_state(&self, state: AnimationState) {
        if self.animation_state.replace(state) != state {
            self.animation_state_changes.emit(&state);
        }
    }

    /// Request the enter transition.
    pub fn start_animation(&self) {
        self.set_animation_state(AnimationState::Entering);
    }

    /// Request the exit transition.
    pub fn reset_animation(&self) {
        self.set_animation_state(AnimationState::Void);
    }

    /// The animation engine started a transition.
    pub fn on_animation_start(&self, event: &AnimationEvent) {
        self.is_animating.set(true);
        if event.to_state == AnimationPhase::Enter && self.active_index() == Some(0) {
            self.scroll_top.set(0.0);
        }
    }

    /// The animation engine finished a transition.
    pub fn on_animation_done(&self, event: &AnimationEvent) {
        self.is_animating.set(false);
        if event.to_state == AnimationPhase::Enter
            && self.animation_state.get() == AnimationState::Entering
        {
            self.set_animation_state(AnimationState::Entered);
        }
        self.animation_done.emit(event);
    }

    /// Scroll offset of the panel content.
    #[must_use]
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top.get()
    }

    /// Report the scroll offset of the panel content.
    pub fn set_scroll_top(&self, scroll_top: f32) {
        self.scroll_top.set(scroll_top);
    }

    // === Teardown ===

    /// Tear the panel and its items down, closing it for any open trigger.
    /// Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        // Listeners still holding the panel open get one last close.
        self.closed.emit(&None);

        let scheduler = self.env.scheduler();
        for pending in [
            self.pending_focus.take(),
            self.pending_tab_index.take(),
            self.pending_type_ahead.take(),
        ]
        .into_iter()
        .flatten()
        {
            scheduler.cancel(pending);
        }

        self.item_relays.clear();
        let lazy = self.lazy_content.borrow_mut().take();
        if let Some(lazy) = lazy {
            lazy.destroy();
        }
        let items = std::mem::take(&mut *self.items.borrow_mut());
        for item in items {
            item.destroy();
        }

        self.closed.complete();
        self.hovered.complete();
        self.items_changed.complete();
        self.animation_done.complete();
        self.animation_state_changes.complete();
        debug!("{} destroyed", self.id);
    }
}

impl fmt::Debug for MenuPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuPanel")
            .field("id", &self.id)
            .field("items", &self.items.borrow().len())
            .field("animation_state", &self.animation_state.get())
            .field("elevation_depth", &self.elevation_depth.get())
            .field("destroyed", &self.destroyed.get())
            .finish_non_exhaustive()
    }
}
