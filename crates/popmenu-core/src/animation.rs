//! Panel transition states.

use serde::{Deserialize, Serialize};

use crate::id::ElementId;

/// Trigger state bound to the panel's enter/exit transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationPhase {
    /// Hidden.
    Void,
    /// Visible.
    Enter,
}

/// Lifecycle state of a panel's transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationState {
    /// Closed, or closing.
    #[default]
    Void,
    /// Opening animation requested.
    Entering,
    /// Opening animation finished.
    Entered,
}

impl AnimationState {
    /// Phase the animation engine should transition to.
    #[must_use]
    pub const fn phase(self) -> AnimationPhase {
        match self {
            Self::Void => AnimationPhase::Void,
            Self::Entering | Self::Entered => AnimationPhase::Enter,
        }
    }
}

/// Start or completion of a transition, reported by the animation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEvent {
    /// Phase being left.
    pub from_state: AnimationPhase,
    /// Phase being entered.
    pub to_state: AnimationPhase,
    /// Element being animated.
    pub element: ElementId,
}

impl AnimationEvent {
    /// Create an event.
    #[must_use]
    pub const fn new(from_state: AnimationPhase, to_state: AnimationPhase, element: ElementId) -> Self {
        Self {
            from_state,
            to_state,
            element,
        }
    }

    /// Transition into the visible phase.
    #[must_use]
    pub const fn enter(element: ElementId) -> Self {
        Self::new(AnimationPhase::Void, AnimationPhase::Enter, element)
    }

    /// Transition into the hidden phase.
    #[must_use]
    pub const fn exit(element: ElementId) -> Self {
        Self::new(AnimationPhase::Enter, AnimationPhase::Void, element)
    }
}
