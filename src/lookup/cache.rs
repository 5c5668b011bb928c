//! Recording and replay of a lookup's result stream.
//!
//! Entries are stored as [`EntryReference`](crate::model::EntryReference)s
//! and resolved again on replay, so a cached lookup holds little memory.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{LookupError, Result, SearchError};
use crate::model::{SharedDictionary, SharedEntry, SharedReference};

use super::handler::{LookupStart, ResultHandler, SharedHandler};
use super::proxy::ResultProxy;

#[derive(Debug, Clone)]
enum Recorded {
    Start(LookupStart),
    Dictionary(SharedDictionary),
    Entry(SharedReference),
    Exception(SearchError),
    Note(String),
}

/// A [`ResultProxy`] that also records what passes through it.
///
/// `start` clears the previous recording. `end` is forwarded but not
/// recorded; replay always finishes with its own `end`.
#[derive(Default)]
pub struct ResultCache {
    log: Mutex<Vec<Recorded>>,
    proxy: ResultProxy,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache forwarding to `handler`.
    pub fn forwarding_to(handler: SharedHandler) -> Self {
        let cache = Self::new();
        cache.add_handler(handler);
        cache
    }

    /// Cache holding `entries` under `description`, as if a lookup had produced them.
    pub fn from_entries<I>(description: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<SharedEntry, SearchError>>,
    {
        let cache = Self::new();
        cache.set_data(description, entries);
        cache
    }

    /// Replace the recording without notifying any handler.
    pub fn set_data<I>(&self, description: impl Into<String>, entries: I)
    where
        I: IntoIterator<Item = std::result::Result<SharedEntry, SearchError>>,
    {
        let mut log = self.log();
        log.clear();
        log.push(Recorded::Start(LookupStart::Description(description.into())));
        for entry in entries {
            log.push(match entry {
                Ok(entry) => Recorded::Entry(entry.reference()),
                Err(e) => Recorded::Exception(e),
            });
        }
    }

    pub fn add_handler(&self, handler: SharedHandler) {
        self.proxy.add_handler(handler);
    }

    pub fn remove_handler(&self, handler: &SharedHandler) -> bool {
        self.proxy.remove_handler(handler)
    }

    pub fn clear_handlers(&self) {
        self.proxy.clear_handlers();
    }

    pub fn clear(&self) {
        self.log().clear();
    }

    /// Number of recorded events, including `start`.
    pub fn len(&self) -> usize {
        self.log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    /// Independent copy of the recording without any handlers.
    pub fn snapshot(&self) -> Self {
        Self {
            log: Mutex::new(self.log().clone()),
            proxy: ResultProxy::new(),
        }
    }

    /// Re-emit the recording to the registered handlers, then `end`.
    ///
    /// References that no longer resolve are reported through `exception`.
    pub fn replay(&self) -> Result<()> {
        let log = self.log().clone();
        if log.is_empty() {
            return Err(LookupError::EmptyCache);
        }
        debug!(events = log.len(), "Replaying cached lookup");

        for recorded in &log {
            match recorded {
                Recorded::Start(start) => self.proxy.start(start),
                Recorded::Dictionary(dictionary) => self.proxy.dictionary(dictionary),
                Recorded::Entry(reference) => match reference.resolve() {
                    Ok(entry) => self.proxy.entry(&entry),
                    Err(e) => self.proxy.exception(&e),
                },
                Recorded::Exception(e) => self.proxy.exception(e),
                Recorded::Note(note) => self.proxy.note(note),
            }
        }
        self.proxy.end();
        Ok(())
    }

    /// Replay to the registered handlers and additionally to `handler`.
    pub fn replay_to(&self, handler: SharedHandler) -> Result<()> {
        self.proxy.add_handler(handler.clone());
        let result = self.replay();
        self.proxy.remove_handler(&handler);
        result
    }

    fn log(&self) -> MutexGuard<'_, Vec<Recorded>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, recorded: Recorded) {
        self.log().push(recorded);
    }
}

impl ResultHandler for ResultCache {
    fn start(&self, start: &LookupStart) {
        {
            let mut log = self.log();
            log.clear();
            log.push(Recorded::Start(start.clone()));
        }
        self.proxy.start(start);
    }

    fn dictionary(&self, dictionary: &SharedDictionary) {
        self.record(Recorded::Dictionary(dictionary.clone()));
        self.proxy.dictionary(dictionary);
    }

    fn entry(&self, entry: &SharedEntry) {
        self.record(Recorded::Entry(entry.reference()));
        self.proxy.entry(entry);
    }

    fn exception(&self, error: &SearchError) {
        self.record(Recorded::Exception(error.clone()));
        self.proxy.exception(error);
    }

    fn note(&self, note: &str) {
        self.record(Recorded::Note(note.to_string()));
        self.proxy.note(note);
    }

    fn end(&self) {
        self.proxy.end();
    }
}

impl fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("events", &self.len())
            .field("handlers", &self.proxy.handler_count())
            .finish()
    }
}
