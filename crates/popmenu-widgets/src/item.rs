//! Menu item widget.
//!
//! A [`MenuItem`] is one selectable row of a [`MenuPanel`]. An item may own
//! an embedded [`MenuTrigger`], which turns it into a submenu launcher.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;
use popmenu_core::{
    ElementId, Emitter, EventStatus, FocusOptions, FocusOrigin, ListKeyItem, MenuError,
    Subscription,
};
use serde::{Deserialize, Serialize};

use crate::env::MenuEnvironment;
use crate::panel::MenuPanel;
use crate::trigger::MenuTrigger;

/// Part of an item's visible content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSegment {
    /// Visible text.
    Text(String),
    /// Icon ligature; never part of the label.
    Icon(String),
}

/// Accessibility role of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MenuItemRole {
    /// Plain action.
    #[default]
    MenuItem,
    /// Checkable action.
    MenuItemCheckbox,
    /// Exclusive choice.
    MenuItemRadio,
}

impl MenuItemRole {
    /// ARIA role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MenuItem => "menuitem",
            Self::MenuItemCheckbox => "menuitemcheckbox",
            Self::MenuItemRadio => "menuitemradio",
        }
    }
}

/// Builder for [`MenuItem`].
#[derive(Debug)]
pub struct MenuItemBuilder {
    env: MenuEnvironment,
    segments: Vec<LabelSegment>,
    role: MenuItemRole,
    disabled: bool,
    disable_ripple: bool,
    offset_top: f32,
}

impl MenuItemBuilder {
    /// Append visible text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(LabelSegment::Text(text.into()));
        self
    }

    /// Append an icon.
    #[must_use]
    pub fn icon(mut self, name: impl Into<String>) -> Self {
        self.segments.push(LabelSegment::Icon(name.into()));
        self
    }

    /// Set the role.
    #[must_use]
    pub const fn role(mut self, role: MenuItemRole) -> Self {
        self.role = role;
        self
    }

    /// Set disabled state.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Turn off the ripple effect.
    #[must_use]
    pub const fn disable_ripple(mut self, disable: bool) -> Self {
        self.disable_ripple = disable;
        self
    }

    /// Vertical offset of the item inside its panel.
    #[must_use]
    pub const fn offset_top(mut self, offset: f32) -> Self {
        self.offset_top = offset;
        self
    }

    /// Build the item.
    pub fn build(self) -> Rc<MenuItem> {
        let host = self.env.ids().next_element_id();
        let item = Rc::new_cyclic(|weak_self| MenuItem {
            weak_self: weak_self.clone(),
            host,
            role: self.role,
            segments: RefCell::new(self.segments),
            disabled: Cell::new(self.disabled),
            disable_ripple: Cell::new(self.disable_ripple),
            highlighted: Cell::new(false),
            triggers_submenu: Cell::new(false),
            offset_top: Cell::new(self.offset_top),
            tab_index: Cell::new(if self.disabled { -1 } else { 0 }),
            focus_origin: Cell::new(None),
            parent: RefCell::new(Weak::new()),
            trigger: RefCell::new(None),
            hovered: Emitter::new(),
            focused: Emitter::new(),
            activated: Emitter::new(),
            monitor: RefCell::new(None),
            destroyed: Cell::new(false),
            env: self.env,
        });

        let weak = Rc::downgrade(&item);
        let monitor = item.env.focus().monitor(host).subscribe(move |origin| {
            if let Some(item) = weak.upgrade() {
                item.focus_origin.set(*origin);
            }
        });
        *item.monitor.borrow_mut() = Some(monitor);
        item
    }
}

/// A selectable row of a menu panel.
pub struct MenuItem {
    weak_self: Weak<MenuItem>,
    env: MenuEnvironment,
    host: ElementId,
    role: MenuItemRole,
    segments: RefCell<Vec<LabelSegment>>,
    disabled: Cell<bool>,
    disable_ripple: Cell<bool>,
    highlighted: Cell<bool>,
    triggers_submenu: Cell<bool>,
    offset_top: Cell<f32>,
    tab_index: Cell<i32>,
    focus_origin: Cell<Option<FocusOrigin>>,
    parent: RefCell<Weak<MenuPanel>>,
    trigger: RefCell<Option<Rc<MenuTrigger>>>,
    hovered: Emitter<Rc<MenuItem>>,
    focused: Emitter<Rc<MenuItem>>,
    activated: Emitter<Rc<MenuItem>>,
    monitor: RefCell<Option<Subscription>>,
    destroyed: Cell<bool>,
}

impl MenuItem {
    /// Start building an item.
    #[must_use]
    pub fn builder(env: &MenuEnvironment) -> MenuItemBuilder {
        MenuItemBuilder {
            env: env.clone(),
            segments: Vec::new(),
            role: MenuItemRole::MenuItem,
            disabled: false,
            disable_ripple: false,
            offset_top: 0.0,
        }
    }

    /// Create an enabled item with a text label.
    pub fn new(env: &MenuEnvironment, label: impl Into<String>) -> Rc<Self> {
        Self::builder(env).text(label).build()
    }

    fn rc(&self) -> Option<Rc<Self>> {
        self.weak_self.upgrade()
    }

    /// Host element of the item.
    #[must_use]
    pub const fn host(&self) -> ElementId {
        self.host
    }

    /// Accessibility role.
    #[must_use]
    pub const fn role(&self) -> MenuItemRole {
        self.role
    }

    /// Visible text with icons left out, trimmed.
    #[must_use]
    pub fn get_label(&self) -> String {
        let text: String = self
            .segments
            .borrow()
            .iter()
            .filter_map(|segment| match segment {
                LabelSegment::Text(text) => Some(text.as_str()),
                LabelSegment::Icon(_) => None,
            })
            .collect();
        text.trim().to_string()
    }

    /// Replace the item content.
    pub fn set_segments(&self, segments: Vec<LabelSegment>) {
        *self.segments.borrow_mut() = segments;
    }

    /// Check if the item is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Enable or disable the item.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
        if disabled {
            self.tab_index.set(-1);
        }
    }

    /// Check if the ripple effect is off.
    #[must_use]
    pub fn is_ripple_disabled(&self) -> bool {
        self.disable_ripple.get() || self.disabled.get()
    }

    /// Turn the ripple effect on or off.
    pub fn set_disable_ripple(&self, disable: bool) {
        self.disable_ripple.set(disable);
    }

    /// Check if the item is highlighted because its submenu is open.
    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted.get()
    }

    /// Set the highlight. Owned by the embedded trigger.
    pub fn mark_highlighted(&self, highlighted: bool) {
        self.highlighted.set(highlighted);
    }

    /// Check if the item opens a submenu.
    #[must_use]
    pub fn triggers_submenu(&self) -> bool {
        self.triggers_submenu.get()
    }

    /// Set the submenu flag. Owned by the embedded trigger.
    pub fn mark_triggers_submenu(&self, triggers: bool) {
        self.triggers_submenu.set(triggers);
    }

    /// Vertical offset of the item inside its panel.
    #[must_use]
    pub fn offset_top(&self) -> f32 {
        self.offset_top.get()
    }

    /// Report the item's vertical offset from layout.
    pub fn set_offset_top(&self, offset: f32) {
        self.offset_top.set(offset);
    }

    /// Tab index: `0` for the item that takes Tab focus, `-1` otherwise.
    #[must_use]
    pub fn tab_index(&self) -> i32 {
        self.tab_index.get()
    }

    pub(crate) fn set_tab_index(&self, index: i32) {
        self.tab_index.set(index);
    }

    /// Origin of the last focus gain, `None` while unfocused.
    #[must_use]
    pub fn focus_origin(&self) -> Option<FocusOrigin> {
        self.focus_origin.get()
    }

    /// Check if the item's host holds focus.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.env.focus().focused_element() == Some(self.host)
    }

    /// Panel containing the item.
    #[must_use]
    pub fn parent_menu(&self) -> Option<Rc<MenuPanel>> {
        self.parent.borrow().upgrade()
    }

    pub(crate) fn set_parent_menu(&self, panel: Option<&Rc<MenuPanel>>) {
        let changed = {
            let mut parent = self.parent.borrow_mut();
            let next = panel.map_or_else(Weak::new, Rc::downgrade);
            let changed = !parent.ptr_eq(&next);
            *parent = next;
            changed
        };
        if changed {
            let trigger = self.trigger.borrow().clone();
            if let Some(trigger) = trigger {
                trigger.parent_menu_changed();
            }
        }
    }

    /// Embedded submenu trigger, if one was created.
    #[must_use]
    pub fn submenu_trigger(&self) -> Option<Rc<MenuTrigger>> {
        self.trigger.borrow().clone()
    }

    /// Submenu opened by this item.
    #[must_use]
    pub fn submenu(&self) -> Option<Rc<MenuPanel>> {
        self.submenu_trigger().and_then(|trigger| trigger.menu())
    }

    /// Make the item open `menu` as a submenu.
    ///
    /// Creates the embedded trigger on first use. Fails if `menu` would
    /// contain itself.
    pub fn set_submenu(&self, menu: Option<Rc<MenuPanel>>) -> Result<Rc<MenuTrigger>, MenuError> {
        if let Some(trigger) = self.submenu_trigger() {
            trigger.set_menu(menu)?;
            return Ok(trigger);
        }

        let trigger = MenuTrigger::for_item(&self.env, self.weak_self.clone(), self.host);
        trigger.set_menu(menu)?;
        *self.trigger.borrow_mut() = Some(Rc::clone(&trigger));
        trigger.parent_menu_changed();
        Ok(trigger)
    }

    /// Focus the item and announce it.
    pub fn focus(&self, origin: Option<FocusOrigin>, options: FocusOptions) {
        match origin {
            Some(origin) => self.env.focus().focus_via(self.host, origin, options),
            None => self.env.focus().focus(self.host, options),
        }
        if let Some(me) = self.rc() {
            self.focused.emit(&me);
        }
    }

    /// Pointer entered the item.
    pub fn handle_mouse_enter(&self) {
        if let Some(me) = self.rc() {
            self.hovered.emit(&me);
        }
    }

    /// Item was clicked or activated with Enter/Space.
    ///
    /// Disabled items swallow the click. Submenu launchers open their
    /// submenu. Other items announce activation and close their panel.
    pub fn handle_click(&self) -> EventStatus {
        if self.destroyed.get() || self.disabled.get() {
            return EventStatus::Captured;
        }

        if let Some(trigger) = self.submenu_trigger().filter(|t| t.triggers_submenu()) {
            return trigger.handle_click();
        }

        debug!("menu item '{}' activated", self.get_label());
        if let Some(me) = self.rc() {
            self.activated.emit(&me);
        }
        if let Some(parent) = self.parent_menu() {
            parent.handle_click();
        }
        EventStatus::Captured
    }

    /// Pointer entered the item.
    #[must_use]
    pub const fn hovered(&self) -> &Emitter<Rc<Self>> {
        &self.hovered
    }

    /// The item received focus.
    #[must_use]
    pub const fn focused(&self) -> &Emitter<Rc<Self>> {
        &self.focused
    }

    /// The item was activated.
    #[must_use]
    pub const fn activated(&self) -> &Emitter<Rc<Self>> {
        &self.activated
    }

    /// `aria-disabled` value.
    #[must_use]
    pub fn aria_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// `aria-haspopup` value.
    #[must_use]
    pub fn aria_haspopup(&self) -> Option<&'static str> {
        self.submenu_trigger().and_then(|trigger| trigger.aria_haspopup())
    }

    /// `aria-expanded` value, present only for submenu launchers.
    #[must_use]
    pub fn aria_expanded(&self) -> Option<bool> {
        self.submenu_trigger()
            .filter(|trigger| trigger.menu().is_some())
            .map(|trigger| trigger.menu_open())
    }

    /// Check if the item was destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Tear the item down. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let monitor = self.monitor.borrow_mut().take();
        drop(monitor);
        self.env.focus().stop_monitoring(self.host);

        let trigger = self.trigger.borrow().clone();
        if let Some(trigger) = trigger {
            trigger.destroy();
        }
        self.hovered.complete();
        self.focused.complete();
        self.activated.complete();
    }
}

impl ListKeyItem for MenuItem {
    fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    fn label(&self) -> String {
        self.get_label()
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("host", &self.host)
            .field("label", &self.get_label())
            .field("disabled", &self.disabled.get())
            .field("highlighted", &self.highlighted.get())
            .field("triggers_submenu", &self.triggers_submenu.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::env_for;
    use popmenu_core::FocusService;
    use popmenu_test::TestServices;

    fn setup() -> (TestServices, MenuEnvironment) {
        let services = TestServices::new();
        let env = env_for(&services);
        (services, env)
    }

    // =========================================================================
    // Label Tests
    // =========================================================================

    #[test]
    fn test_label_excludes_icons() {
        let (_, env) = setup();
        let item = MenuItem::builder(&env)
            .icon("content_copy")
            .text("  Copy ")
            .icon("keyboard")
            .build();
        assert_eq!(item.get_label(), "Copy");
    }

    #[test]
    fn test_label_joins_text_segments() {
        let (_, env) = setup();
        let item = MenuItem::builder(&env).text("Save ").icon("x").text("As").build();
        assert_eq!(item.get_label(), "Save As");
        assert_eq!(ListKeyItem::label(&*item), "Save As");

        item.set_segments(vec![LabelSegment::Text("Export".into())]);
        assert_eq!(item.get_label(), "Export");
    }

    // =========================================================================
    // State Tests
    // =========================================================================

    #[test]
    fn test_flags() {
        let (_, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        assert!(!item.is_disabled());
        assert_eq!(item.tab_index(), 0);

        item.mark_highlighted(true);
        item.mark_triggers_submenu(true);
        assert!(item.is_highlighted());
        assert!(item.triggers_submenu());

        item.set_disabled(true);
        assert!(item.aria_disabled());
        assert_eq!(item.tab_index(), -1);
        assert!(item.is_ripple_disabled());
    }

    #[test]
    fn test_role() {
        let (_, env) = setup();
        let item = MenuItem::builder(&env)
            .text("Bold")
            .role(MenuItemRole::MenuItemCheckbox)
            .build();
        assert_eq!(item.role().as_str(), "menuitemcheckbox");
    }

    #[test]
    fn test_ripple() {
        let (_, env) = setup();
        let item = MenuItem::builder(&env).text("Cut").disable_ripple(true).build();
        assert!(item.is_ripple_disabled());
        item.set_disable_ripple(false);
        assert!(!item.is_ripple_disabled());
    }

    // =========================================================================
    // Focus Tests
    // =========================================================================

    #[test]
    fn test_focus_via_origin() {
        let (services, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = item.focused().subscribe(move |_| s.set(s.get() + 1));

        item.focus(Some(FocusOrigin::Keyboard), FocusOptions::default());

        assert!(item.has_focus());
        assert_eq!(seen.get(), 1);
        assert_eq!(item.focus_origin(), Some(FocusOrigin::Keyboard));
        let last = services.focus.last_focus().unwrap();
        assert_eq!(last.origin, Some(FocusOrigin::Keyboard));
    }

    #[test]
    fn test_plain_focus() {
        let (services, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        item.focus(None, FocusOptions::default());

        assert_eq!(services.focus.last_focus().unwrap().origin, None);
        assert_eq!(item.focus_origin(), Some(FocusOrigin::Program));

        services.focus.focus(ElementId(999), FocusOptions::default());
        assert_eq!(item.focus_origin(), None);
    }

    // =========================================================================
    // Event Tests
    // =========================================================================

    #[test]
    fn test_mouse_enter_emits_hovered() {
        let (_, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        let hovered = Rc::new(RefCell::new(None));
        let h = Rc::clone(&hovered);
        let _sub = item
            .hovered()
            .subscribe(move |it| *h.borrow_mut() = Some(it.host()));

        item.handle_mouse_enter();
        assert_eq!(*hovered.borrow(), Some(item.host()));
    }

    #[test]
    fn test_click_disabled_is_swallowed() {
        let (_, env) = setup();
        let item = MenuItem::builder(&env).text("Undo").disabled(true).build();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = item.activated().subscribe(move |_| c.set(c.get() + 1));

        assert_eq!(item.handle_click(), EventStatus::Captured);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_click_activates() {
        let (_, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = item.activated().subscribe(move |_| c.set(c.get() + 1));

        item.handle_click();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_no_submenu_aria() {
        let (_, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        assert_eq!(item.aria_haspopup(), None);
        assert_eq!(item.aria_expanded(), None);
        assert!(item.submenu().is_none());
    }

    // =========================================================================
    // Teardown Tests
    // =========================================================================

    #[test]
    fn test_destroy_is_idempotent() {
        let (services, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        assert!(services.focus.is_monitoring(item.host()));

        item.destroy();
        item.destroy();

        assert!(item.is_destroyed());
        assert!(!services.focus.is_monitoring(item.host()));
        assert!(item.hovered().is_completed());
        assert_eq!(item.handle_click(), EventStatus::Captured);
    }

    #[test]
    fn test_debug() {
        let (_, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        assert!(format!("{item:?}").contains("Undo"));
    }

    #[test]
    fn test_has_focus_tracks_service() {
        let (services, env) = setup();
        let item = MenuItem::new(&env, "Undo");
        services.focus.focus(item.host(), FocusOptions::default());
        assert!(item.has_focus());
    }
}
