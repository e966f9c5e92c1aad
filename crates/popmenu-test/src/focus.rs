//! In-memory focus host.

use std::cell::RefCell;
use std::collections::HashMap;

use log::trace;
use popmenu_core::{ElementId, Emitter, FocusOptions, FocusOrigin, FocusService};

/// A recorded focus call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRecord {
    /// Element that received focus.
    pub element: ElementId,
    /// Origin passed with the call, if any.
    pub origin: Option<FocusOrigin>,
}

/// Focus service that tracks the focused element and every focus call.
///
/// Monitored elements are notified when they gain focus (with the origin)
/// and when they lose it (with `None`).
#[derive(Default)]
pub struct RecordingFocusService {
    focused: RefCell<Option<ElementId>>,
    history: RefCell<Vec<FocusRecord>>,
    monitors: RefCell<HashMap<ElementId, Emitter<Option<FocusOrigin>>>>,
}

impl RecordingFocusService {
    /// Create a service with nothing focused.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn move_focus(&self, element: ElementId, origin: Option<FocusOrigin>) {
        trace!("focus {element} via {origin:?}");
        self.history.borrow_mut().push(FocusRecord { element, origin });
        let previous = self.focused.replace(Some(element));

        if let Some(previous) = previous.filter(|p| *p != element) {
            let monitor = self.monitors.borrow().get(&previous).cloned();
            if let Some(monitor) = monitor {
                monitor.emit(&None);
            }
        }
        let monitor = self.monitors.borrow().get(&element).cloned();
        if let Some(monitor) = monitor {
            monitor.emit(&Some(origin.unwrap_or(FocusOrigin::Program)));
        }
    }

    /// Move focus outside every tracked element.
    pub fn blur(&self) {
        let previous = self.focused.replace(None);
        if let Some(previous) = previous {
            let monitor = self.monitors.borrow().get(&previous).cloned();
            if let Some(monitor) = monitor {
                monitor.emit(&None);
            }
        }
    }

    /// Every focus call, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<FocusRecord> {
        self.history.borrow().clone()
    }

    /// Most recent focus call.
    #[must_use]
    pub fn last_focus(&self) -> Option<FocusRecord> {
        self.history.borrow().last().copied()
    }

    /// Number of focus calls that targeted `element`.
    #[must_use]
    pub fn focus_count(&self, element: ElementId) -> usize {
        self.history
            .borrow()
            .iter()
            .filter(|record| record.element == element)
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }

    /// Check if an element is being monitored.
    #[must_use]
    pub fn is_monitoring(&self, element: ElementId) -> bool {
        self.monitors.borrow().contains_key(&element)
    }
}

impl FocusService for RecordingFocusService {
    fn focus_via(&self, element: ElementId, origin: FocusOrigin, _options: FocusOptions) {
        self.move_focus(element, Some(origin));
    }

    fn focus(&self, element: ElementId, _options: FocusOptions) {
        self.move_focus(element, None);
    }

    fn focused_element(&self) -> Option<ElementId> {
        *self.focused.borrow()
    }

    fn monitor(&self, element: ElementId) -> Emitter<Option<FocusOrigin>> {
        self.monitors
            .borrow_mut()
            .entry(element)
            .or_default()
            .clone()
    }

    fn stop_monitoring(&self, element: ElementId) {
        let removed = self.monitors.borrow_mut().remove(&element);
        if let Some(monitor) = removed {
            monitor.complete();
        }
    }
}
