//! Focus origins and the host focus service.

use serde::{Deserialize, Serialize};

use crate::emitter::Emitter;
use crate::id::ElementId;

/// How an interaction that moved focus was initiated.
///
/// The absence of an origin is expressed as `Option::<FocusOrigin>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusOrigin {
    /// Pointer device.
    Mouse,
    /// Touch screen.
    Touch,
    /// Keyboard navigation.
    Keyboard,
    /// Programmatic call.
    Program,
}

impl FocusOrigin {
    /// Check if focus came from the keyboard.
    #[must_use]
    pub const fn is_keyboard(self) -> bool {
        matches!(self, Self::Keyboard)
    }
}

/// Options forwarded to the host focus call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusOptions {
    /// Do not scroll the element into view.
    pub prevent_scroll: bool,
}

impl FocusOptions {
    /// Focus without scrolling.
    #[must_use]
    pub const fn prevent_scroll() -> Self {
        Self {
            prevent_scroll: true,
        }
    }
}

/// Host focus API.
///
/// Implemented by the embedding application; menus never move focus except
/// through this trait.
pub trait FocusService {
    /// Focus an element, recording the origin of the interaction.
    fn focus_via(&self, element: ElementId, origin: FocusOrigin, options: FocusOptions);

    /// Focus an element without an origin.
    fn focus(&self, element: ElementId, options: FocusOptions);

    /// Element currently holding focus.
    fn focused_element(&self) -> Option<ElementId>;

    /// Start monitoring an element.
    ///
    /// The returned channel emits the origin each time the element gains
    /// focus and `None` when it loses focus.
    fn monitor(&self, element: ElementId) -> Emitter<Option<FocusOrigin>>;

    /// Stop monitoring an element.
    fn stop_monitoring(&self, element: ElementId);
}
