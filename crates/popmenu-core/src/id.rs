//! Element and panel identifiers.

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for a host element (anchor, panel container, item host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Create a new element ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element-{}", self.0)
    }
}

/// Hands out unique identifiers.
///
/// One allocator is owned by the application root and shared with every menu
/// built from the same environment. Counters never reset.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_element: Cell<u64>,
    next_panel: Cell<u64>,
}

impl IdAllocator {
    /// Create an allocator starting from zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh element ID.
    pub fn next_element_id(&self) -> ElementId {
        let id = self.next_element.get();
        self.next_element.set(id + 1);
        ElementId(id)
    }

    /// Allocate a panel ID of the form `menu-panel-N`.
    pub fn next_panel_id(&self) -> String {
        let id = self.next_panel.get();
        self.next_panel.set(id + 1);
        format!("menu-panel-{id}")
    }

    /// Number of element IDs handed out so far.
    #[must_use]
    pub fn elements_allocated(&self) -> u64 {
        self.next_element.get()
    }
}
