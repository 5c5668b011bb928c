//! Collaborator interfaces: dictionaries, their entries, and result filters.
//!
//! The lookup core never looks inside a dictionary. It only asks whether a
//! mode is supported, which fields can be searched, and pulls entries from a
//! lazy result stream.

use std::fmt;
use std::sync::Arc;

use crate::error::SearchError;

use super::fields::SearchFieldSelection;
use super::mode::{SearchMode, SearchParameter};

/// Shared handle to a dictionary. Compared by identity.
pub type SharedDictionary = Arc<dyn Dictionary>;

/// Shared handle to a result entry.
pub type SharedEntry = Arc<dyn DictionaryEntry>;

/// Shared handle to a lightweight entry reference.
pub type SharedReference = Arc<dyn EntryReference>;

/// Shared handle to a result filter. Compared by identity.
pub type SharedFilter = Arc<dyn ResultFilter>;

/// Lazy stream of search results. Each item may fail on its own.
pub type EntryIter = Box<dyn Iterator<Item = Result<SharedEntry, SearchError>> + Send>;

/// A searchable dictionary.
pub trait Dictionary: Send + Sync + fmt::Debug {
    /// Display name, also used to select a dictionary by name.
    fn name(&self) -> &str;

    /// Whether `mode` can be used on this dictionary.
    ///
    /// `exclusive` is `true` when the dictionary is the only one queried.
    fn supports(&self, mode: &SearchMode, exclusive: bool) -> bool;

    /// Fields and match modes this dictionary can search with `mode`.
    fn supported_fields(&self, mode: &SearchMode) -> SearchFieldSelection;

    /// Start a search. `parameters` follow the order of `mode.parameters()`.
    fn search(&self, mode: &SearchMode, parameters: &[SearchParameter])
        -> Result<EntryIter, SearchError>;
}

/// A single search result.
pub trait DictionaryEntry: Send + Sync + fmt::Debug {
    /// Name of the dictionary the entry came from.
    fn dictionary_name(&self) -> &str;

    /// Headword.
    fn word(&self) -> &str;

    /// Reading of the headword, if the dictionary records one.
    fn reading(&self) -> Option<&str>;

    /// Translations in dictionary order.
    fn translations(&self) -> &[String];

    /// A cheap descriptor from which this entry can be recreated later.
    fn reference(&self) -> SharedReference;
}

/// Lightweight, cheaply clonable descriptor of a [`DictionaryEntry`].
///
/// The result cache stores these instead of full entries.
pub trait EntryReference: Send + Sync + fmt::Debug {
    /// Recreate the referenced entry.
    fn resolve(&self) -> Result<SharedEntry, SearchError>;
}

/// Restricts the entries reported by a lookup.
pub trait ResultFilter: Send + Sync + fmt::Debug {
    /// Short name, also used to select a filter by name.
    fn name(&self) -> &str;

    /// Longer text for presentation layers.
    fn description(&self) -> &str {
        self.name()
    }

    /// Whether `entry` passes the filter.
    fn accept(&self, entry: &dyn DictionaryEntry) -> bool;

    /// Whether the filter is meaningful for results of `dictionary`.
    fn enable_for(&self, dictionary: &dyn Dictionary) -> bool;
}
