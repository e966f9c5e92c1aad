//! Keyboard navigation over a flat list of options.
//!
//! [`FocusKeyManager`] tracks the active option of a list and translates key
//! presses into moves: arrows with optional wrap-around, home/end, and
//! type-ahead by label prefix. Disabled options are skipped. The manager
//! never owns the options; callers pass the current slice on every call so
//! the list can change between key presses.

use crate::event::{Key, KeyboardEvent};
use crate::focus::FocusOrigin;

/// An option the key manager can navigate to.
pub trait ListKeyItem {
    /// Disabled options are skipped by navigation.
    fn is_disabled(&self) -> bool;

    /// Text matched by type-ahead.
    fn label(&self) -> String;
}

impl<T: ListKeyItem + ?Sized> ListKeyItem for std::rc::Rc<T> {
    fn is_disabled(&self) -> bool {
        (**self).is_disabled()
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

/// Outcome of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManagerAction {
    /// The key is not a navigation key.
    Unhandled,
    /// The key was consumed but the active option did not change.
    Handled,
    /// The active option moved to this index.
    ActiveChanged(usize),
    /// Tab was pressed; the list wants to give up focus.
    TabOut,
}

impl KeyManagerAction {
    /// Check if the key was consumed.
    #[must_use]
    pub const fn is_handled(self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// Active-option tracker for keyboard navigation.
#[derive(Debug, Clone)]
pub struct FocusKeyManager {
    active_index: Option<usize>,
    origin: FocusOrigin,
    wrap: bool,
    home_and_end: bool,
    type_ahead: bool,
    buffer: String,
}

impl Default for FocusKeyManager {
    fn default() -> Self {
        Self {
            active_index: None,
            origin: FocusOrigin::Program,
            wrap: false,
            home_and_end: false,
            type_ahead: false,
            buffer: String::new(),
        }
    }
}

impl FocusKeyManager {
    /// Create a manager with wrap, home/end and type-ahead disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap from the last option to the first and back.
    #[must_use]
    pub const fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Handle Home and End.
    #[must_use]
    pub const fn with_home_and_end(mut self, enabled: bool) -> Self {
        self.home_and_end = enabled;
        self
    }

    /// Match option labels against typed characters.
    #[must_use]
    pub const fn with_type_ahead(mut self, enabled: bool) -> Self {
        self.type_ahead = enabled;
        self
    }

    /// Index of the active option.
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Origin reported for the next focus move.
    #[must_use]
    pub const fn focus_origin(&self) -> FocusOrigin {
        self.origin
    }

    /// Set the origin reported for the next focus move.
    pub fn set_focus_origin(&mut self, origin: FocusOrigin) {
        self.origin = origin;
    }

    /// Set the active index without any checks.
    pub fn update_active_item(&mut self, index: Option<usize>) {
        self.active_index = index;
    }

    /// Clear the active option.
    pub fn reset_active_item(&mut self) {
        self.active_index = None;
    }

    /// Typed characters waiting to be cleared.
    #[must_use]
    pub fn type_ahead_buffer(&self) -> &str {
        &self.buffer
    }

    /// Forget typed characters.
    pub fn clear_type_ahead(&mut self) {
        self.buffer.clear();
    }

    /// Activate the option at `index` if it exists and is enabled.
    pub fn set_active_item<T: ListKeyItem>(&mut self, items: &[T], index: usize) -> Option<usize> {
        let item = items.get(index)?;
        if item.is_disabled() {
            return None;
        }
        self.active_index = Some(index);
        Some(index)
    }

    /// Activate the first enabled option.
    pub fn set_first_item_active<T: ListKeyItem>(&mut self, items: &[T]) -> Option<usize> {
        let index = items.iter().position(|item| !item.is_disabled())?;
        self.active_index = Some(index);
        Some(index)
    }

    /// Activate the last enabled option.
    pub fn set_last_item_active<T: ListKeyItem>(&mut self, items: &[T]) -> Option<usize> {
        let index = items.iter().rposition(|item| !item.is_disabled())?;
        self.active_index = Some(index);
        Some(index)
    }

    /// Move to the next enabled option.
    pub fn set_next_item_active<T: ListKeyItem>(&mut self, items: &[T]) -> Option<usize> {
        match self.active_index {
            None => self.set_first_item_active(items),
            Some(current) => self.step(items, current, true),
        }
    }

    /// Move to the previous enabled option.
    pub fn set_previous_item_active<T: ListKeyItem>(&mut self, items: &[T]) -> Option<usize> {
        match self.active_index {
            None if self.wrap => self.set_last_item_active(items),
            None => None,
            Some(current) => self.step(items, current, false),
        }
    }

    fn step<T: ListKeyItem>(&mut self, items: &[T], current: usize, forward: bool) -> Option<usize> {
        let len = items.len();
        if len == 0 {
            return None;
        }

        let found = if self.wrap {
            (1..=len)
                .map(|offset| {
                    if forward {
                        (current + offset) % len
                    } else {
                        (current + len * 2 - offset) % len
                    }
                })
                .find(|&index| !items[index].is_disabled())
        } else if forward {
            (current + 1..len).find(|&index| !items[index].is_disabled())
        } else {
            (0..current.min(len)).rev().find(|&index| !items[index].is_disabled())
        };

        if let Some(index) = found {
            self.active_index = Some(index);
        }
        found
    }

    fn type_ahead_match<T: ListKeyItem>(&mut self, items: &[T], ch: char) -> Option<usize> {
        self.buffer.extend(ch.to_uppercase());
        let len = items.len();
        if len == 0 {
            return None;
        }

        // A single character cycles past the active option; a longer prefix
        // may keep matching it.
        let start = match self.active_index {
            Some(index) if self.buffer.chars().count() == 1 => index + 1,
            Some(index) => index,
            None => 0,
        };

        let found = (0..len).map(|offset| (start + offset) % len).find(|&index| {
            let item = &items[index];
            !item.is_disabled()
                && item
                    .label()
                    .trim()
                    .to_uppercase()
                    .starts_with(self.buffer.as_str())
        });

        if let Some(index) = found {
            self.active_index = Some(index);
        }
        found
    }

    /// Route a key press.
    pub fn on_keydown<T: ListKeyItem>(
        &mut self,
        event: &KeyboardEvent,
        items: &[T],
    ) -> KeyManagerAction {
        let moved = |index: Option<usize>| {
            index.map_or(KeyManagerAction::Handled, KeyManagerAction::ActiveChanged)
        };

        match event.key {
            Key::Tab => KeyManagerAction::TabOut,
            Key::Down if !event.has_modifier() => moved(self.set_next_item_active(items)),
            Key::Up if !event.has_modifier() => moved(self.set_previous_item_active(items)),
            Key::Home if self.home_and_end && !event.has_modifier() => {
                moved(self.set_first_item_active(items))
            }
            Key::End if self.home_and_end && !event.has_modifier() => {
                moved(self.set_last_item_active(items))
            }
            key => {
                let modifiers = event.modifiers;
                let plain = !(modifiers.ctrl || modifiers.alt || modifiers.meta);
                match key.to_char() {
                    Some(ch) if self.type_ahead && plain => moved(self.type_ahead_match(items, ch)),
                    _ => KeyManagerAction::Unhandled,
                }
            }
        }
    }
}
