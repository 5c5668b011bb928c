//! Selection state wrapper shared by search modes, dictionaries and filters.

use std::sync::Arc;

/// A domain value together with its `selected` and `enabled` flags.
///
/// Lists of options are always searched by [`Identity`] of the wrapped
/// value, never by position, so that replacing a list keeps the state of
/// values that survive the replacement.
#[derive(Debug, Clone)]
pub struct SelectableOption<T> {
    value: T,
    selected: bool,
    enabled: bool,
}

impl<T> SelectableOption<T> {
    /// Wrap a value as unselected and disabled.
    pub fn new(value: T) -> Self {
        Self::with_state(value, false, false)
    }

    pub fn with_state(value: T, selected: bool, enabled: bool) -> Self {
        Self {
            value,
            selected,
            enabled,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Selected and enabled at the same time.
    pub fn is_active(&self) -> bool {
        self.selected && self.enabled
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Identity comparison for option values.
///
/// Shared collaborators (dictionaries, filters) compare by allocation,
/// plain values compare by their key.
pub trait Identity {
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn is_same(&self, other: &Self) -> bool {
        // Compare data pointers only; vtable pointers of the same type may differ
        // between codegen units.
        std::ptr::eq(
            Arc::as_ptr(self) as *const (),
            Arc::as_ptr(other) as *const (),
        )
    }
}

/// Position of `value` within `options`, by identity.
pub fn position_of<T: Identity>(options: &[SelectableOption<T>], value: &T) -> Option<usize> {
    options.iter().position(|o| o.value.is_same(value))
}
