//! Candidate overlay positions for a menu.

use popmenu_core::{
    ConnectedOverlayPositionChange, ConnectedPosition, HorizontalConnectionPos as H,
    VerticalConnectionPos as V, XPosition, YPosition,
};

/// Where a menu is anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Opened from a standalone trigger. `overlap` places the panel over the
    /// trigger instead of next to it.
    Root {
        /// Cover the trigger.
        overlap: bool,
    },
    /// Opened from an item of another panel.
    Submenu {
        /// Vertical offset of the first item in the parent panel.
        padding: f32,
    },
}

/// The four candidate positions for a menu, most preferred first.
///
/// Order: primary, horizontal fallback, vertical fallback, both fallbacks.
/// Vertical fallbacks negate the offset.
#[must_use]
pub fn menu_positions(x: XPosition, y: YPosition, placement: Placement) -> [ConnectedPosition; 4] {
    let (mut origin_x, mut origin_fallback_x) = match x {
        XPosition::Before => (H::End, H::Start),
        XPosition::After => (H::Start, H::End),
    };
    let (overlay_y, overlay_fallback_y) = match y {
        YPosition::Above => (V::Bottom, V::Top),
        YPosition::Below => (V::Top, V::Bottom),
    };
    let (mut origin_y, mut origin_fallback_y) = (overlay_y, overlay_fallback_y);
    let (mut overlay_x, mut overlay_fallback_x) = (origin_x, origin_fallback_x);
    let mut offset_y = 0.0;

    match placement {
        Placement::Submenu { padding } => {
            origin_x = if x == XPosition::Before { H::Start } else { H::End };
            overlay_fallback_x = origin_x;
            overlay_x = origin_x.mirror();
            origin_fallback_x = overlay_x;
            offset_y = if overlay_y == V::Bottom { padding } else { -padding };
        }
        Placement::Root { overlap: false } => {
            origin_y = overlay_y.mirror();
            origin_fallback_y = overlay_fallback_y.mirror();
        }
        Placement::Root { overlap: true } => {}
    }

    [
        ConnectedPosition::new(origin_x, origin_y, overlay_x, overlay_y).with_offset_y(offset_y),
        ConnectedPosition::new(origin_fallback_x, origin_y, overlay_fallback_x, overlay_y)
            .with_offset_y(offset_y),
        ConnectedPosition::new(origin_x, origin_fallback_y, overlay_x, overlay_fallback_y)
            .with_offset_y(-offset_y),
        ConnectedPosition::new(
            origin_fallback_x,
            origin_fallback_y,
            overlay_fallback_x,
            overlay_fallback_y,
        )
        .with_offset_y(-offset_y),
    ]
}

/// Sides a menu actually opened on, from the pair the overlay applied.
#[must_use]
pub fn position_classes(change: &ConnectedOverlayPositionChange) -> (XPosition, YPosition) {
    let pair = change.connection_pair;
    let x = if pair.overlay_x == H::Start {
        XPosition::After
    } else {
        XPosition::Before
    };
    let y = if pair.overlay_y == V::Top {
        YPosition::Below
    } else {
        YPosition::Above
    };
    (x, y)
}
