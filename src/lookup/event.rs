//! Change notifications emitted by [`SearchConfiguration`](super::SearchConfiguration).

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of configuration categories that changed.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChangeSet(u16);

impl ChangeSet {
    pub const SEARCH_MODE_SELECTION: Self = Self(0x0001);
    pub const SEARCH_MODE_AVAILABILITY: Self = Self(0x0002);
    pub const DICTIONARY_SELECTION: Self = Self(0x0004);
    pub const MULTI_DICTIONARY_MODE: Self = Self(0x0008);
    pub const DICTIONARY_AVAILABILITY: Self = Self(0x0010);
    pub const DICTIONARY_LIST_CHANGED: Self = Self(0x0020);
    pub const FILTER_SELECTION: Self = Self(0x0040);
    pub const FILTER_AVAILABILITY: Self = Self(0x0080);
    pub const SEARCH_FIELDS_SELECTION: Self = Self(0x0100);
    pub const SEARCH_FIELDS_AVAILABILITY: Self = Self(0x0200);
    pub const SEARCH_PARAMETERS: Self = Self(0x0400);
    pub const SEARCH_PARAMETERS_AVAILABILITY: Self = Self(0x0800);

    const NAMES: [(ChangeSet, &'static str); 12] = [
        (Self::SEARCH_MODE_SELECTION, "SEARCH_MODE_SELECTION"),
        (Self::SEARCH_MODE_AVAILABILITY, "SEARCH_MODE_AVAILABILITY"),
        (Self::DICTIONARY_SELECTION, "DICTIONARY_SELECTION"),
        (Self::MULTI_DICTIONARY_MODE, "MULTI_DICTIONARY_MODE"),
        (Self::DICTIONARY_AVAILABILITY, "DICTIONARY_AVAILABILITY"),
        (Self::DICTIONARY_LIST_CHANGED, "DICTIONARY_LIST_CHANGED"),
        (Self::FILTER_SELECTION, "FILTER_SELECTION"),
        (Self::FILTER_AVAILABILITY, "FILTER_AVAILABILITY"),
        (Self::SEARCH_FIELDS_SELECTION, "SEARCH_FIELDS_SELECTION"),
        (Self::SEARCH_FIELDS_AVAILABILITY, "SEARCH_FIELDS_AVAILABILITY"),
        (Self::SEARCH_PARAMETERS, "SEARCH_PARAMETERS"),
        (Self::SEARCH_PARAMETERS_AVAILABILITY, "SEARCH_PARAMETERS_AVAILABILITY"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub(crate) fn set_if(&mut self, flag: Self, condition: bool) {
        if condition {
            self.0 |= flag.0;
        }
    }
}

impl BitOr for ChangeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChangeSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("ChangeSet(empty)")
        } else {
            write!(f, "ChangeSet({})", names.join(" | "))
        }
    }
}

/// One notification per public mutation of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    changes: ChangeSet,
    complete: bool,
}

impl ChangeEvent {
    pub fn new(changes: ChangeSet, complete: bool) -> Self {
        Self { changes, complete }
    }

    pub fn changes(&self) -> ChangeSet {
        self.changes
    }

    /// Whether any of the categories in `what` changed.
    pub fn has_changed(&self, what: ChangeSet) -> bool {
        self.changes.intersects(what)
    }

    /// `false` for all but the last event of a batch of grouped changes.
    /// Listeners may start a lookup right away only on complete events.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
