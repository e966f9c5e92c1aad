//! Overlay host contract.
//!
//! Menus render into overlays supplied by the embedding application. The
//! traits here describe what a menu needs from that host; concrete overlays
//! live outside this crate.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::emitter::Emitter;
use crate::event::KeyboardEvent;
use crate::id::ElementId;
use crate::position::ConnectedPositionStrategy;

/// Backdrop class used when none is configured.
pub const DEFAULT_BACKDROP_CLASS: &str = "overlay-transparent-backdrop";

/// What an overlay does when the page scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollStrategy {
    /// Follow the origin element.
    #[default]
    Reposition,
    /// Close the overlay.
    Close,
    /// Block page scrolling.
    Block,
    /// Do nothing.
    Noop,
}

/// Settings an overlay is created with.
#[derive(Clone)]
pub struct OverlayConfig {
    /// Strategy positioning the overlay next to its origin.
    pub position_strategy: Option<Rc<ConnectedPositionStrategy>>,
    /// Whether a backdrop is shown behind the overlay.
    pub has_backdrop: bool,
    /// Class applied to the backdrop.
    pub backdrop_class: String,
    /// Classes applied to the overlay pane.
    pub panel_class: Vec<String>,
    /// Layout direction of the overlay content.
    pub direction: Direction,
    /// Scroll behaviour.
    pub scroll_strategy: ScrollStrategy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            position_strategy: None,
            has_backdrop: false,
            backdrop_class: DEFAULT_BACKDROP_CLASS.to_string(),
            panel_class: Vec::new(),
            direction: Direction::Ltr,
            scroll_strategy: ScrollStrategy::Reposition,
        }
    }
}

impl fmt::Debug for OverlayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayConfig")
            .field("has_position_strategy", &self.position_strategy.is_some())
            .field("has_backdrop", &self.has_backdrop)
            .field("backdrop_class", &self.backdrop_class)
            .field("panel_class", &self.panel_class)
            .field("direction", &self.direction)
            .field("scroll_strategy", &self.scroll_strategy)
            .finish()
    }
}

/// Content attached to an overlay: a menu panel's rendered surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    /// Id of the panel being shown.
    pub panel_id: String,
    /// Container element of the panel.
    pub container: ElementId,
}

impl Portal {
    /// Create a portal for a panel.
    #[must_use]
    pub fn new(panel_id: impl Into<String>, container: ElementId) -> Self {
        Self {
            panel_id: panel_id.into(),
            container,
        }
    }
}

/// Handle to a created overlay.
pub trait OverlayRef {
    /// Show content in the overlay.
    fn attach(&self, portal: Portal);

    /// Remove the content. Emits on [`OverlayRef::detachments`] if attached.
    fn detach(&self);

    /// Tear the overlay down for good.
    fn dispose(&self);

    /// Check if content is attached.
    fn has_attached(&self) -> bool;

    /// Clicks on the backdrop.
    fn backdrop_click(&self) -> Emitter<()>;

    /// Detachments of the content, including those the host initiates.
    fn detachments(&self) -> Emitter<()>;

    /// Key presses dispatched to the overlay.
    fn keydown_events(&self) -> Emitter<KeyboardEvent>;

    /// Current configuration.
    fn config(&self) -> OverlayConfig;

    /// Toggle the backdrop for the next attach.
    fn set_has_backdrop(&self, has_backdrop: bool);

    /// Replace the backdrop class for the next attach.
    fn set_backdrop_class(&self, class: &str);

    /// Replace the classes of the overlay pane for the next attach.
    fn set_panel_class(&self, classes: Vec<String>);

    /// Recompute the overlay position.
    fn update_position(&self);
}

/// Factory for overlays.
pub trait OverlayService {
    /// Create a detached overlay.
    fn create(&self, config: OverlayConfig) -> Rc<dyn OverlayRef>;
}
