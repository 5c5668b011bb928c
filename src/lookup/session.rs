//! A lookup front end: live configuration, async engine, result cache and history.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::Result;

use super::async_engine::AsyncSearchEngine;
use super::cache::ResultCache;
use super::configuration::{ReferenceTarget, SearchConfiguration};
use super::dispatch::Dispatcher;
use super::handler::SharedHandler;
use super::history::{HistoryEntry, SearchHistory, DEFAULT_HISTORY_CAPACITY};

/// Tunables of a [`LookupSession`].
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Stop each lookup after this many entries.
    pub entry_limit: Option<usize>,
    pub history_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            entry_limit: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

type SharedHistory = Arc<Mutex<SearchHistory<ResultCache>>>;

/// Runs lookups for one result view.
///
/// Results flow through a cache into the renderer on the dispatcher's
/// context. Every lookup that completes without being superseded is stored in
/// the history together with its recorded results, so navigating back shows
/// the old results without searching again.
pub struct LookupSession {
    configuration: SearchConfiguration,
    engine: AsyncSearchEngine,
    cache: Arc<ResultCache>,
    history: SharedHistory,
}

impl LookupSession {
    pub fn new(
        configuration: SearchConfiguration,
        renderer: SharedHandler,
        dispatcher: Dispatcher,
        settings: SessionSettings,
    ) -> Result<Self> {
        let cache = Arc::new(ResultCache::forwarding_to(renderer));
        let engine = match settings.entry_limit {
            Some(limit) => AsyncSearchEngine::with_limit(cache.clone(), dispatcher, limit)?,
            None => AsyncSearchEngine::new(cache.clone(), dispatcher)?,
        };
        Ok(Self {
            configuration,
            engine,
            cache,
            history: Arc::new(Mutex::new(SearchHistory::with_capacity(
                settings.history_capacity,
            ))),
        })
    }

    pub fn configuration(&self) -> &SearchConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut SearchConfiguration {
        &mut self.configuration
    }

    /// Look up with the current configuration.
    pub fn lookup(&self) -> Result<()> {
        let snapshot = self.configuration.clone();
        let history = self.history.clone();
        let cache = self.cache.clone();
        self.engine.do_lookup(
            &self.configuration,
            Some(Box::new(move || {
                let entry = HistoryEntry::new(&snapshot, cache.snapshot());
                let mut history = lock(&history);
                history.add_current_state(entry);
                debug!(entries = history.len(), "Lookup stored in history");
            })),
        )
    }

    /// Apply a cross reference and look it up.
    pub fn follow_reference(&mut self, target: &ReferenceTarget) -> Result<()> {
        self.configuration.follow_reference(target)?;
        info!(expression = %target.expression, "Following reference");
        self.lookup()
    }

    pub fn cancel(&self) {
        self.engine.cancel();
    }

    /// Show the previous lookup: restore its configuration and replay its results.
    pub fn back(&mut self) -> Result<()> {
        self.engine.abandon();
        let history = self.history.clone();
        let mut history = lock(&history);
        let entry = history.back()?;
        self.show(entry)
    }

    /// Show the next lookup in the history.
    pub fn forward(&mut self) -> Result<()> {
        self.engine.abandon();
        let history = self.history.clone();
        let mut history = lock(&history);
        let entry = history.forward()?;
        self.show(entry)
    }

    pub fn can_go_back(&self) -> bool {
        lock(&self.history).can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        lock(&self.history).can_go_forward()
    }

    pub fn history_len(&self) -> usize {
        lock(&self.history).len()
    }

    /// Stop the engine. The session accepts no more lookups.
    pub fn dispose(&mut self) {
        self.engine.dispose();
    }

    fn show(&mut self, entry: &HistoryEntry<ResultCache>) -> Result<()> {
        self.configuration.restore_from(entry.configuration());
        entry.view_state().replay_to(self.cache.clone())
    }
}

fn lock(history: &SharedHistory) -> MutexGuard<'_, SearchHistory<ResultCache>> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::LookupError;
    use crate::lookup::dispatch::DispatchQueue;
    use crate::lookup::testing::{Event, RecordingHandler, TestDictionary};
    use crate::model::SearchMode;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn session(queue: &DispatchQueue) -> (LookupSession, Arc<RecordingHandler>) {
        let d1 = TestDictionary::new("d1", &["any"])
            .with_words(&["neko", "koneko", "inu"])
            .shared();
        let config = SearchConfiguration::new(vec![SearchMode::any()], vec![d1], vec![]);
        let renderer = RecordingHandler::shared();
        let session = LookupSession::new(
            config,
            renderer.clone(),
            queue.dispatcher(),
            SessionSettings::default(),
        )
        .unwrap();
        (session, renderer)
    }

    #[test]
    fn test_completed_lookups_enter_history() {
        let queue = DispatchQueue::new();
        let (mut session, renderer) = session(&queue);

        session.configuration_mut().set_search_expression("neko");
        session.lookup().unwrap();
        assert!(queue.run_until(TIMEOUT, || session.history_len() == 1));
        assert_eq!(renderer.words(), vec!["neko", "koneko"]);

        session.configuration_mut().set_search_expression("inu");
        session.lookup().unwrap();
        assert!(queue.run_until(TIMEOUT, || session.history_len() == 2));
        assert!(session.can_go_back());
        assert!(!session.can_go_forward());
    }

    #[test]
    fn test_back_restores_configuration_and_results() {
        let queue = DispatchQueue::new();
        let (mut session, renderer) = session(&queue);
        for (i, expression) in ["neko", "inu"].into_iter().enumerate() {
            session.configuration_mut().set_search_expression(expression);
            session.lookup().unwrap();
            assert!(queue.run_until(TIMEOUT, || session.history_len() == i + 1));
        }
        let shown_before = renderer.events().len();

        session.back().unwrap();

        assert_eq!(session.configuration().expression(), "neko");
        let replayed = renderer.events()[shown_before..].to_vec();
        assert_eq!(replayed.first(), Some(&Event::Start("any \"neko\"".into())));
        assert_eq!(replayed.last(), Some(&Event::End));
        assert!(matches!(session.back(), Err(LookupError::HistoryAtStart)));

        session.forward().unwrap();
        assert_eq!(session.configuration().expression(), "inu");
        assert_eq!(renderer.words().last().map(String::as_str), Some("inu"));
    }

    #[test]
    fn test_back_while_lookup_in_flight_shows_history_entry() {
        let queue = DispatchQueue::new();
        let d1 = TestDictionary::new("d1", &["any"])
            .with_words(&["neko", "koneko", "inu", "slow1", "slow2"])
            .with_delay(Duration::from_millis(20))
            .shared();
        let config = SearchConfiguration::new(vec![SearchMode::any()], vec![d1], vec![]);
        let renderer = RecordingHandler::shared();
        let mut session = LookupSession::new(
            config,
            renderer.clone(),
            queue.dispatcher(),
            SessionSettings::default(),
        )
        .unwrap();
        for (i, expression) in ["neko", "inu"].into_iter().enumerate() {
            session.configuration_mut().set_search_expression(expression);
            session.lookup().unwrap();
            assert!(queue.run_until(TIMEOUT, || session.history_len() == i + 1));
        }

        session.configuration_mut().set_search_expression("slow");
        session.lookup().unwrap();
        // The worker posts events that are still queued when going back.
        std::thread::sleep(Duration::from_millis(30));
        let shown_before = renderer.events().len();
        session.back().unwrap();
        queue.run_until(Duration::from_millis(200), || false);

        assert_eq!(
            renderer.events()[shown_before..].to_vec(),
            vec![
                Event::Start("any \"neko\"".into()),
                Event::Dictionary("d1".into()),
                Event::Entry("neko".into()),
                Event::Entry("koneko".into()),
                Event::End,
            ]
        );
        assert_eq!(session.configuration().expression(), "neko");
        assert_eq!(session.history_len(), 2);
        assert!(session.can_go_forward());
    }
}
