//! Core data model: search modes, field selections, selectable options and
//! the dictionary collaborator interfaces.

pub mod dictionary;
pub mod fields;
pub mod mode;
pub mod option;

pub use dictionary::{
    Dictionary, DictionaryEntry, EntryIter, EntryReference, ResultFilter, SharedDictionary,
    SharedEntry, SharedFilter, SharedReference,
};
pub use fields::{MatchMode, SearchField, SearchFieldSelection};
pub use mode::{SearchMode, SearchParameter, SearchParameterKind};
pub use option::{Identity, SelectableOption};
