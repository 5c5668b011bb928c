//! In-memory dictionaries and recording handlers for unit tests.

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::error::SearchError;
use crate::model::{
    Dictionary, DictionaryEntry, EntryIter, EntryReference, ResultFilter, SearchFieldSelection,
    SearchMode, SearchParameter, SharedDictionary, SharedEntry, SharedFilter, SharedReference,
};

use super::handler::{LookupStart, ResultHandler};

#[derive(Debug)]
pub(crate) struct TestDictionary {
    name: String,
    /// Mode id and whether the mode is usable when other dictionaries are queried too.
    modes: Vec<(String, bool)>,
    fields: SearchFieldSelection,
    words: Vec<String>,
    failing: bool,
    broken: Vec<usize>,
    stale: bool,
    delay: Option<Duration>,
}

impl TestDictionary {
    pub(crate) fn new(name: &str, modes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            modes: modes.iter().map(|m| (m.to_string(), true)).collect(),
            fields: SearchFieldSelection::all(),
            words: Vec::new(),
            failing: false,
            broken: Vec::new(),
            stale: false,
            delay: None,
        }
    }

    /// Make `mode` usable only when this dictionary is searched alone.
    pub(crate) fn exclusive_only(mut self, mode: &str) -> Self {
        for (id, shared) in self.modes.iter_mut() {
            if id == mode {
                *shared = false;
            }
        }
        self
    }

    pub(crate) fn with_words(mut self, words: &[&str]) -> Self {
        self.words = words.iter().map(|w| w.to_string()).collect();
        self
    }

    pub(crate) fn with_fields(mut self, fields: SearchFieldSelection) -> Self {
        self.fields = fields;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// The entry at `index` of a result stream fails to load.
    pub(crate) fn broken_at(mut self, index: usize) -> Self {
        self.broken.push(index);
        self
    }

    /// References of produced entries no longer resolve.
    pub(crate) fn with_stale_references(mut self) -> Self {
        self.stale = true;
        self
    }

    /// Sleep before producing each entry.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn shared(self) -> SharedDictionary {
        Arc::new(self)
    }
}

impl Dictionary for TestDictionary {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, mode: &SearchMode, exclusive: bool) -> bool {
        self.modes
            .iter()
            .any(|(id, shared)| id == mode.id() && (exclusive || *shared))
    }

    fn supported_fields(&self, _mode: &SearchMode) -> SearchFieldSelection {
        self.fields
    }

    fn search(
        &self,
        _mode: &SearchMode,
        parameters: &[SearchParameter],
    ) -> Result<EntryIter, SearchError> {
        if self.failing {
            return Err(SearchError::Dictionary {
                dictionary: self.name.clone(),
                reason: "index missing".to_string(),
            });
        }

        let expression = parameters
            .iter()
            .find_map(SearchParameter::as_expression)
            .unwrap_or_default()
            .to_string();
        let matches: Vec<String> = self
            .words
            .iter()
            .filter(|w| w.contains(&expression))
            .cloned()
            .collect();
        let name = self.name.clone();
        let broken = self.broken.clone();
        let stale = self.stale;
        let delay = self.delay;

        Ok(Box::new(matches.into_iter().enumerate().map(
            move |(i, word)| {
                if let Some(delay) = delay {
                    thread::sleep(delay);
                }
                if broken.contains(&i) {
                    return Err(SearchError::Entry {
                        reason: format!("corrupt record {i}"),
                    });
                }
                let entry: SharedEntry = Arc::new(TestEntry {
                    dictionary: name.clone(),
                    word,
                    translations: vec!["gloss".to_string()],
                    stale,
                });
                Ok(entry)
            },
        )))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TestEntry {
    dictionary: String,
    word: String,
    translations: Vec<String>,
    stale: bool,
}

impl DictionaryEntry for TestEntry {
    fn dictionary_name(&self) -> &str {
        &self.dictionary
    }

    fn word(&self) -> &str {
        &self.word
    }

    fn reading(&self) -> Option<&str> {
        None
    }

    fn translations(&self) -> &[String] {
        &self.translations
    }

    fn reference(&self) -> SharedReference {
        Arc::new(TestReference(self.clone()))
    }
}

#[derive(Debug)]
struct TestReference(TestEntry);

impl EntryReference for TestReference {
    fn resolve(&self) -> Result<SharedEntry, SearchError> {
        if self.0.stale {
            return Err(SearchError::StaleReference {
                reason: format!("{} was removed", self.0.word),
            });
        }
        Ok(Arc::new(self.0.clone()))
    }
}

pub(crate) fn entry(dictionary: &str, word: &str) -> SharedEntry {
    Arc::new(TestEntry {
        dictionary: dictionary.to_string(),
        word: word.to_string(),
        translations: Vec::new(),
        stale: false,
    })
}

/// Rejects one word; enabled only for the named dictionaries.
#[derive(Debug)]
pub(crate) struct TestFilter {
    name: String,
    reject: String,
    dictionaries: Vec<String>,
}

impl TestFilter {
    pub(crate) fn shared(name: &str, reject: &str, dictionaries: &[&str]) -> SharedFilter {
        Arc::new(Self {
            name: name.to_string(),
            reject: reject.to_string(),
            dictionaries: dictionaries.iter().map(|d| d.to_string()).collect(),
        })
    }
}

impl ResultFilter for TestFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, entry: &dyn DictionaryEntry) -> bool {
        entry.word() != self.reject
    }

    fn enable_for(&self, dictionary: &dyn Dictionary) -> bool {
        self.dictionaries.iter().any(|d| d == dictionary.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Start(String),
    Dictionary(String),
    Entry(String),
    Exception(String),
    Note(String),
    End,
}

/// Records every event together with the thread it arrived on.
#[derive(Default)]
pub(crate) struct RecordingHandler {
    events: Mutex<Vec<(Event, ThreadId)>>,
}

impl RecordingHandler {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .unwrap()
            .push((event, thread::current().id()));
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub(crate) fn threads(&self) -> Vec<ThreadId> {
        self.events.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub(crate) fn words(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Entry(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }
}

impl ResultHandler for RecordingHandler {
    fn start(&self, start: &LookupStart) {
        self.push(Event::Start(start.summary()));
    }

    fn dictionary(&self, dictionary: &SharedDictionary) {
        self.push(Event::Dictionary(dictionary.name().to_string()));
    }

    fn entry(&self, entry: &SharedEntry) {
        self.push(Event::Entry(entry.word().to_string()));
    }

    fn exception(&self, error: &SearchError) {
        self.push(Event::Exception(error.to_string()));
    }

    fn note(&self, note: &str) {
        self.push(Event::Note(note.to_string()));
    }

    fn end(&self) {
        self.push(Event::End);
    }
}
