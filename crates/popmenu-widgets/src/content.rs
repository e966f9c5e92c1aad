//! Lazily rendered menu content.
//!
//! Menus with many items, or items that depend on where the menu was opened
//! from, can defer building them until the menu opens. A
//! [`LazyMenuContent`] holds a template that turns the trigger's context
//! value into items. The items are rendered on every open and removed once
//! the panel's exit animation has finished.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;
use popmenu_core::{ElementId, Emitter, MenuError};
use serde_json::Value;

use crate::env::MenuEnvironment;
use crate::item::MenuItem;
use crate::panel::MenuPanel;

/// Builds the items of a menu from the context it was opened with.
pub type MenuTemplate = Box<dyn Fn(&MenuEnvironment, &Value) -> Vec<Rc<MenuItem>>>;

/// Deferred item template attached to a panel.
pub struct LazyMenuContent {
    env: MenuEnvironment,
    template: MenuTemplate,
    anchor: ElementId,
    host: Cell<Option<ElementId>>,
    panel: RefCell<Weak<MenuPanel>>,
    rendered: RefCell<Vec<Rc<MenuItem>>>,
    is_attached: Cell<bool>,
    insertions: Cell<usize>,
    instantiations: Cell<usize>,
    attached: Emitter<()>,
    destroyed: Cell<bool>,
}

impl LazyMenuContent {
    /// Create content from a template.
    pub fn new<F>(env: &MenuEnvironment, template: F) -> Rc<Self>
    where
        F: Fn(&MenuEnvironment, &Value) -> Vec<Rc<MenuItem>> + 'static,
    {
        Rc::new(Self {
            env: env.clone(),
            template: Box::new(template),
            anchor: env.ids().next_element_id(),
            host: Cell::new(None),
            panel: RefCell::new(Weak::new()),
            rendered: RefCell::new(Vec::new()),
            is_attached: Cell::new(false),
            insertions: Cell::new(0),
            instantiations: Cell::new(0),
            attached: Emitter::new(),
            destroyed: Cell::new(false),
        })
    }

    pub(crate) fn set_panel(&self, panel: &Weak<MenuPanel>) {
        *self.panel.borrow_mut() = panel.clone();
    }

    /// Render the template with `context`, replacing any earlier rendering.
    ///
    /// The host element is created on the first call and re-inserted next to
    /// the template anchor on every call. Fails if the rendered items would
    /// make the panel contain itself; nothing stays rendered in that case.
    pub fn attach(&self, context: &Value) -> Result<(), MenuError> {
        if self.destroyed.get() {
            return Ok(());
        }
        if self.host.get().is_none() {
            self.host.set(Some(self.env.ids().next_element_id()));
        }
        self.detach();
        self.insertions.set(self.insertions.get() + 1);

        let items = (self.template)(&self.env, context);
        self.instantiations.set(self.instantiations.get() + 1);

        let panel = self.panel.borrow().upgrade();
        if let Some(panel) = panel {
            if let Err(err) = panel.set_items(items.clone()) {
                for item in &items {
                    item.destroy();
                }
                return Err(err);
            }
        }

        debug!("lazy content rendered {} items", items.len());
        *self.rendered.borrow_mut() = items;
        self.is_attached.set(true);
        self.attached.emit(&());
        Ok(())
    }

    /// Remove and destroy the rendered items. No-op if nothing is rendered.
    pub fn detach(&self) {
        if !self.is_attached.replace(false) {
            return;
        }
        let rendered = std::mem::take(&mut *self.rendered.borrow_mut());

        let panel = self.panel.borrow().upgrade();
        if let Some(panel) = panel {
            let remaining: Vec<Rc<MenuItem>> = panel
                .items()
                .into_iter()
                .filter(|item| !rendered.iter().any(|r| Rc::ptr_eq(r, item)))
                .collect();
            panel.set_items_unchecked(remaining);
        }
        for item in rendered {
            item.destroy();
        }
    }

    /// Detach and refuse further rendering. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.detach();
        self.attached.complete();
    }

    /// Check if items are rendered.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.is_attached.get()
    }

    /// Host element, once created.
    #[must_use]
    pub fn host(&self) -> Option<ElementId> {
        self.host.get()
    }

    /// Element the host is inserted next to.
    #[must_use]
    pub const fn anchor(&self) -> ElementId {
        self.anchor
    }

    /// Number of times the host was inserted.
    #[must_use]
    pub fn insertions(&self) -> usize {
        self.insertions.get()
    }

    /// Number of times the template was rendered.
    #[must_use]
    pub fn instantiations(&self) -> usize {
        self.instantiations.get()
    }

    /// Fires after each render.
    #[must_use]
    pub const fn attached(&self) -> &Emitter<()> {
        &self.attached
    }
}

impl fmt::Debug for LazyMenuContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyMenuContent")
            .field("host", &self.host.get())
            .field("attached", &self.is_attached.get())
            .field("instantiations", &self.instantiations.get())
            .finish_non_exhaustive()
    }
}
