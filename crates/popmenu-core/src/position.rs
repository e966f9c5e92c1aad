//! Connected positioning of an overlay relative to its origin element.
//!
//! A [`ConnectedPositionStrategy`] holds an ordered list of candidate
//! [`ConnectedPosition`] pairs. The host layout engine measures the viewport
//! and reports which pair fits through [`ConnectedPositionStrategy::apply`]
//! or [`ConnectedPositionStrategy::apply_first_fit`]; the strategy records
//! the choice and announces it on [`ConnectedPositionStrategy::position_changes`].

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use crate::emitter::Emitter;
use crate::id::ElementId;

/// Horizontal edge of the origin or the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalConnectionPos {
    /// Leading edge (left in LTR).
    Start,
    /// Horizontal center.
    Center,
    /// Trailing edge (right in LTR).
    End,
}

impl HorizontalConnectionPos {
    /// The opposite edge. Center mirrors to itself.
    #[must_use]
    pub const fn mirror(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::Center => Self::Center,
            Self::End => Self::Start,
        }
    }
}

/// Vertical edge of the origin or the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalConnectionPos {
    /// Top edge.
    Top,
    /// Vertical center.
    Center,
    /// Bottom edge.
    Bottom,
}

impl VerticalConnectionPos {
    /// The opposite edge. Center mirrors to itself.
    #[must_use]
    pub const fn mirror(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Center => Self::Center,
            Self::Bottom => Self::Top,
        }
    }
}

/// A pairing of an origin point with an overlay point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectedPosition {
    /// Horizontal point on the origin.
    pub origin_x: HorizontalConnectionPos,
    /// Vertical point on the origin.
    pub origin_y: VerticalConnectionPos,
    /// Horizontal point on the overlay.
    pub overlay_x: HorizontalConnectionPos,
    /// Vertical point on the overlay.
    pub overlay_y: VerticalConnectionPos,
    /// Horizontal offset in pixels.
    #[serde(default)]
    pub offset_x: f32,
    /// Vertical offset in pixels.
    #[serde(default)]
    pub offset_y: f32,
}

impl ConnectedPosition {
    /// Create a position pair with no offsets.
    #[must_use]
    pub const fn new(
        origin_x: HorizontalConnectionPos,
        origin_y: VerticalConnectionPos,
        overlay_x: HorizontalConnectionPos,
        overlay_y: VerticalConnectionPos,
    ) -> Self {
        Self {
            origin_x,
            origin_y,
            overlay_x,
            overlay_y,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Set the vertical offset.
    #[must_use]
    pub const fn with_offset_y(mut self, offset_y: f32) -> Self {
        self.offset_y = offset_y;
        self
    }
}

/// Announcement of the pair that was actually applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectedOverlayPositionChange {
    /// The applied pair.
    pub connection_pair: ConnectedPosition,
    /// Index of the pair in the strategy's list.
    pub index: usize,
}

/// Position strategy that keeps an overlay attached to an origin element.
#[derive(Debug)]
pub struct ConnectedPositionStrategy {
    origin: ElementId,
    positions: RefCell<Vec<ConnectedPosition>>,
    locked: bool,
    grow_after_open: bool,
    transform_origin_selector: Option<String>,
    last_index: Cell<Option<usize>>,
    reapply_count: Cell<u32>,
    position_changes: Emitter<ConnectedOverlayPositionChange>,
}

impl ConnectedPositionStrategy {
    /// Create a strategy anchored to `origin` with no positions.
    #[must_use]
    pub fn new(origin: ElementId) -> Self {
        Self {
            origin,
            positions: RefCell::new(Vec::new()),
            locked: false,
            grow_after_open: false,
            transform_origin_selector: None,
            last_index: Cell::new(None),
            reapply_count: Cell::new(0),
            position_changes: Emitter::new(),
        }
    }

    /// Keep the first applied pair until the overlay is re-attached.
    #[must_use]
    pub fn with_locked_position(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Allow the overlay to grow after it opens.
    #[must_use]
    pub fn with_grow_after_open(mut self, grow: bool) -> Self {
        self.grow_after_open = grow;
        self
    }

    /// Selector of the element whose transform origin follows the pair.
    #[must_use]
    pub fn with_transform_origin_on(mut self, selector: impl Into<String>) -> Self {
        self.transform_origin_selector = Some(selector.into());
        self
    }

    /// Replace the candidate pairs, most preferred first.
    pub fn with_positions(&self, positions: Vec<ConnectedPosition>) {
        *self.positions.borrow_mut() = positions;
        self.last_index.set(None);
    }

    /// Element the overlay is connected to.
    #[must_use]
    pub const fn origin(&self) -> ElementId {
        self.origin
    }

    /// Candidate pairs.
    #[must_use]
    pub fn positions(&self) -> Vec<ConnectedPosition> {
        self.positions.borrow().clone()
    }

    /// Check if the position is locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Check if the overlay may grow after opening.
    #[must_use]
    pub const fn grows_after_open(&self) -> bool {
        self.grow_after_open
    }

    /// Transform-origin selector, if any.
    #[must_use]
    pub fn transform_origin_selector(&self) -> Option<&str> {
        self.transform_origin_selector.as_deref()
    }

    /// Forget the last applied pair. Called by the overlay on attach.
    pub fn attach(&self) {
        self.last_index.set(None);
    }

    /// Apply the pair at `index`, announcing it if it changed.
    pub fn apply(&self, index: usize) -> Option<ConnectedPosition> {
        let pair = self.positions.borrow().get(index).copied()?;
        if self.last_index.replace(Some(index)) != Some(index) {
            self.position_changes.emit(&ConnectedOverlayPositionChange {
                connection_pair: pair,
                index,
            });
        }
        Some(pair)
    }

    /// Apply the first pair accepted by `fits`, or the primary pair if none
    /// fits. A locked strategy keeps its last pair.
    pub fn apply_first_fit<F>(&self, fits: F) -> Option<ConnectedPosition>
    where
        F: Fn(&ConnectedPosition) -> bool,
    {
        if self.locked {
            if let Some(index) = self.last_index.get() {
                return self.apply(index);
            }
        }
        let index = self.positions.borrow().iter().position(&fits).unwrap_or(0);
        self.apply(index)
    }

    /// Re-apply the last pair without searching for a better fit.
    pub fn reapply_last_position(&self) -> Option<ConnectedPosition> {
        let index = self.last_index.get()?;
        self.reapply_count.set(self.reapply_count.get() + 1);
        self.positions.borrow().get(index).copied()
    }

    /// Index of the last applied pair.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.last_index.get()
    }

    /// Number of re-applications so far.
    #[must_use]
    pub fn reapply_count(&self) -> u32 {
        self.reapply_count.get()
    }

    /// Stream of applied pairs.
    #[must_use]
    pub const fn position_changes(&self) -> &Emitter<ConnectedOverlayPositionChange> {
        &self.position_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use HorizontalConnectionPos as H;
    use VerticalConnectionPos as V;

    fn pairs() -> Vec<ConnectedPosition> {
        vec![
            ConnectedPosition::new(H::Start, V::Bottom, H::Start, V::Top),
            ConnectedPosition::new(H::End, V::Bottom, H::End, V::Top),
            ConnectedPosition::new(H::Start, V::Top, H::Start, V::Bottom).with_offset_y(-4.0),
        ]
    }

    fn recorded(strategy: &ConnectedPositionStrategy) -> (Rc<RefCell<Vec<usize>>>, crate::emitter::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let sub = strategy
            .position_changes()
            .subscribe(move |change| s.borrow_mut().push(change.index));
        (seen, sub)
    }

    #[test]
    fn test_mirror() {
        assert_eq!(H::Start.mirror(), H::End);
        assert_eq!(H::Center.mirror(), H::Center);
        assert_eq!(V::Bottom.mirror(), V::Top);
    }

    #[test]
    fn test_builder() {
        let strategy = ConnectedPositionStrategy::new(ElementId(3))
            .with_locked_position(true)
            .with_grow_after_open(true)
            .with_transform_origin_on(".menu-panel");
        assert_eq!(strategy.origin(), ElementId(3));
        assert!(strategy.is_locked());
        assert!(strategy.grows_after_open());
        assert_eq!(strategy.transform_origin_selector(), Some(".menu-panel"));
    }

    #[test]
    fn test_apply_emits_only_on_change() {
        let strategy = ConnectedPositionStrategy::new(ElementId(0));
        strategy.with_positions(pairs());
        let (seen, _sub) = recorded(&strategy);

        assert!(strategy.apply(1).is_some());
        assert!(strategy.apply(1).is_some());
        assert!(strategy.apply(0).is_some());
        assert!(strategy.apply(7).is_none());

        assert_eq!(*seen.borrow(), vec![1, 0]);
        assert_eq!(strategy.last_index(), Some(0));
    }

    #[test]
    fn test_apply_first_fit_falls_back_to_primary() {
        let strategy = ConnectedPositionStrategy::new(ElementId(0));
        strategy.with_positions(pairs());

        let fit = strategy.apply_first_fit(|p| p.overlay_y == V::Bottom);
        assert_eq!(fit.map(|p| p.offset_y), Some(-4.0));

        let none = strategy.apply_first_fit(|_| false);
        assert_eq!(none, Some(pairs()[0]));
    }

    #[test]
    fn test_locked_strategy_keeps_pair_until_attach() {
        let strategy = ConnectedPositionStrategy::new(ElementId(0)).with_locked_position(true);
        strategy.with_positions(pairs());

        strategy.apply_first_fit(|p| p.origin_x == H::End);
        strategy.apply_first_fit(|_| true);
        assert_eq!(strategy.last_index(), Some(1));

        strategy.attach();
        strategy.apply_first_fit(|_| true);
        assert_eq!(strategy.last_index(), Some(0));
    }

    #[test]
    fn test_reapply_last_position() {
        let strategy = ConnectedPositionStrategy::new(ElementId(0));
        strategy.with_positions(pairs());
        assert!(strategy.reapply_last_position().is_none());
        assert_eq!(strategy.reapply_count(), 0);

        strategy.apply(2);
        assert_eq!(strategy.reapply_last_position(), Some(pairs()[2]));
        assert_eq!(strategy.reapply_count(), 1);
    }

    #[test]
    fn test_new_positions_reset_last() {
        let strategy = ConnectedPositionStrategy::new(ElementId(0));
        strategy.with_positions(pairs());
        strategy.apply(1);
        strategy.with_positions(pairs());
        assert_eq!(strategy.last_index(), None);
        assert_eq!(strategy.positions().len(), 3);
    }
}
