//! Plain-text word list dictionaries.
//!
//! A word list is a tab separated file with one entry per line:
//!
//! ```text
//! # comment
//! 猫	ねこ	cat/puss
//! dog		canine
//! ```
//!
//! Columns are headword, optional reading and `/`-separated translations.
//! Word lists support the expression modes in every configuration and the
//! `near` mode only when searched on their own.

pub mod loader;
pub mod matching;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::SearchError;
use crate::model::{
    Dictionary, DictionaryEntry, EntryIter, EntryReference, MatchMode, SearchFieldSelection,
    SearchMode, SearchParameter, SharedEntry, SharedReference,
};

pub use loader::{load_word_list, parse_word_list};
use matching::Matcher;

/// One parsed line of a word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordRecord {
    pub word: String,
    pub reading: Option<String>,
    pub translations: Vec<String>,
}

/// An in-memory word list dictionary.
#[derive(Debug)]
pub struct WordList {
    name: Arc<str>,
    path: Option<PathBuf>,
    records: Arc<Vec<WordRecord>>,
}

impl WordList {
    pub fn new(name: impl Into<String>, records: Vec<WordRecord>) -> Self {
        Self {
            name: Arc::from(name.into()),
            path: None,
            records: Arc::new(records),
        }
    }

    pub(crate) fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// File the list was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }
}

fn is_expression_mode(mode: &SearchMode) -> bool {
    matches!(mode.id(), "exact" | "prefix" | "suffix" | "any")
}

impl Dictionary for WordList {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, mode: &SearchMode, exclusive: bool) -> bool {
        is_expression_mode(mode) || (mode.id() == "near" && exclusive)
    }

    fn supported_fields(&self, mode: &SearchMode) -> SearchFieldSelection {
        if is_expression_mode(mode) {
            SearchFieldSelection::all()
        } else if mode.id() == "near" {
            SearchFieldSelection::new(true, true, false, MatchMode::Field)
        } else {
            SearchFieldSelection::none()
        }
    }

    fn search(
        &self,
        mode: &SearchMode,
        parameters: &[SearchParameter],
    ) -> Result<EntryIter, SearchError> {
        let matcher = Matcher::new(mode, parameters).map_err(|reason| SearchError::Dictionary {
            dictionary: self.name.to_string(),
            reason,
        })?;
        debug!(dictionary = %self.name, mode = %mode, "Searching word list");

        let name = self.name.clone();
        let records = self.records.clone();
        Ok(Box::new((0..records.len()).filter_map(move |index| {
            if !matcher.matches(&records[index]) {
                return None;
            }
            let entry: SharedEntry = Arc::new(WordListEntry {
                dictionary: name.clone(),
                records: records.clone(),
                index,
            });
            Some(Ok(entry))
        })))
    }
}

/// A result from a [`WordList`]. Shares the list's records.
#[derive(Debug, Clone)]
pub struct WordListEntry {
    dictionary: Arc<str>,
    records: Arc<Vec<WordRecord>>,
    index: usize,
}

impl WordListEntry {
    fn record(&self) -> &WordRecord {
        &self.records[self.index]
    }

    /// Line order position within the list.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl DictionaryEntry for WordListEntry {
    fn dictionary_name(&self) -> &str {
        &self.dictionary
    }

    fn word(&self) -> &str {
        &self.record().word
    }

    fn reading(&self) -> Option<&str> {
        self.record().reading.as_deref()
    }

    fn translations(&self) -> &[String] {
        &self.record().translations
    }

    fn reference(&self) -> SharedReference {
        Arc::new(WordListReference(self.clone()))
    }
}

#[derive(Debug)]
struct WordListReference(WordListEntry);

impl EntryReference for WordListReference {
    fn resolve(&self) -> Result<SharedEntry, SearchError> {
        if self.0.index >= self.0.records.len() {
            return Err(SearchError::StaleReference {
                reason: format!("entry {} of '{}'", self.0.index, self.0.dictionary),
            });
        }
        Ok(Arc::new(self.0.clone()))
    }
}
