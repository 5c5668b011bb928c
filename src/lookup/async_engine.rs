//! Single-flight asynchronous lookups.
//!
//! [`AsyncSearchEngine`] owns one worker thread. Each `do_lookup` cancels the
//! lookup in flight, snapshots the configuration and queues a new run. Result
//! events and the completion callback are posted to a [`Dispatcher`], so they
//! arrive on the designated context in emission order.
//!
//! Events are checked again when they are delivered: once a lookup is
//! cancelled, whatever it had already posted is dropped, except for an `end`
//! that closes a `start` the handler has seen.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel as channel;
use tracing::{debug, error, warn};

use crate::error::{LookupError, Result, SearchError};
use crate::model::{SharedDictionary, SharedEntry};

use super::configuration::SearchConfiguration;
use super::dispatch::{Callback, Dispatcher};
use super::engine::{CancellationFlag, SearchEngine};
use super::handler::{LookupStart, ResultHandler, SharedHandler};

/// Handle of one requested lookup. Compared by identity.
#[derive(Debug, Default)]
struct Task {
    id: u64,
    cancel: CancellationFlag,
    /// The worker is done with this task.
    finished: AtomicBool,
    /// `start` was delivered on the designated context.
    started: AtomicBool,
    /// Not even `end` is delivered any more.
    detached: AtomicBool,
}

impl Task {
    fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// `end` still has a `start` to close.
    fn is_open(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.detached.load(Ordering::Acquire)
    }
}

struct Job {
    task: Arc<Task>,
    config: SearchConfiguration,
    on_complete: Option<Callback>,
}

type CurrentTask = Arc<Mutex<Option<Arc<Task>>>>;

pub struct AsyncSearchEngine {
    jobs: Option<channel::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    current: CurrentTask,
    next_id: AtomicU64,
}

impl AsyncSearchEngine {
    /// Start the worker. Events for `handler` are posted through `dispatcher`.
    pub fn new(handler: SharedHandler, dispatcher: Dispatcher) -> Result<Self> {
        Self::spawn(handler, dispatcher, None)
    }

    /// Like [`new`](Self::new), stopping each lookup after `limit` entries.
    pub fn with_limit(handler: SharedHandler, dispatcher: Dispatcher, limit: usize) -> Result<Self> {
        Self::spawn(handler, dispatcher, Some(limit))
    }

    fn spawn(handler: SharedHandler, dispatcher: Dispatcher, limit: Option<usize>) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        let current: CurrentTask = Arc::new(Mutex::new(None));
        let worker = Worker {
            handler,
            dispatcher,
            limit,
            current: current.clone(),
        };

        let worker = thread::Builder::new()
            .name("lookup-worker".to_string())
            .spawn(move || worker.run(&rx))
            .map_err(LookupError::Worker)?;

        Ok(Self {
            jobs: Some(tx),
            worker: Some(worker),
            current,
            next_id: AtomicU64::new(0),
        })
    }

    /// Start a lookup, superseding the one in flight.
    ///
    /// `config` is copied; later edits do not affect this lookup. `on_complete`
    /// runs on the designated context after `end`, unless another lookup was
    /// requested before this one completed.
    pub fn do_lookup(
        &self,
        config: &SearchConfiguration,
        on_complete: Option<Callback>,
    ) -> Result<()> {
        let jobs = self.jobs.as_ref().ok_or(LookupError::EngineDisposed)?;
        let task = Arc::new(Task::new(self.next_id.fetch_add(1, Ordering::Relaxed)));

        {
            let mut current = lock(&self.current);
            if let Some(previous) = current.replace(task.clone()) {
                if !previous.finished.load(Ordering::Acquire) {
                    debug!(task = previous.id, "Superseding lookup");
                    previous.cancel.cancel();
                }
            }
        }

        debug!(task = task.id, expression = config.expression(), "Queueing lookup");
        jobs.send(Job {
            task,
            config: config.clone(),
            on_complete,
        })
        .map_err(|_| LookupError::EngineDisposed)
    }

    /// Cancel the latest lookup. Its undelivered events and its completion
    /// callback are dropped; `end` still arrives if `start` was delivered.
    pub fn cancel(&self) {
        if let Some(task) = lock(&self.current).as_ref() {
            debug!(task = task.id, "Cancelling lookup");
            task.cancel.cancel();
        }
    }

    /// Cancel the latest lookup and drop everything it has not delivered yet,
    /// `end` included. Call on the designated context before showing other
    /// results in the same handler.
    pub fn abandon(&self) {
        if let Some(task) = lock(&self.current).as_ref() {
            debug!(task = task.id, "Abandoning lookup");
            task.cancel.cancel();
            task.detached.store(true, Ordering::Release);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.jobs.is_none()
    }

    /// Cancel pending work and stop the worker. Further lookups are rejected.
    ///
    /// Blocks until the running lookup observes its cancellation flag.
    pub fn dispose(&mut self) {
        if self.jobs.is_none() && self.worker.is_none() {
            return;
        }
        self.cancel();
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Lookup worker panicked");
            }
        }
        debug!("Lookup engine disposed");
    }
}

impl Drop for AsyncSearchEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn lock(current: &CurrentTask) -> std::sync::MutexGuard<'_, Option<Arc<Task>>> {
    current.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State owned by the worker thread.
struct Worker {
    handler: SharedHandler,
    dispatcher: Dispatcher,
    limit: Option<usize>,
    current: CurrentTask,
}

impl Worker {
    fn run(&self, jobs: &channel::Receiver<Job>) {
        for job in jobs.iter() {
            let task = job.task;
            if task.cancel.is_cancelled() {
                debug!(task = task.id, "Skipping superseded lookup");
                continue;
            }

            let failed = match self.engine_for(&task).execute_cancellable(&job.config, &task.cancel) {
                Ok(summary) => {
                    debug!(
                        task = task.id,
                        entries = summary.entries,
                        cancelled = summary.cancelled,
                        "Lookup done"
                    );
                    false
                }
                Err(e) => {
                    error!(task = task.id, error = %e, "Lookup failed");
                    true
                }
            };

            // Decide under the lock so a concurrent do_lookup either supersedes
            // this task before the check or comes strictly after the callback.
            let current = lock(&self.current);
            task.finished.store(true, Ordering::Release);
            let is_current = current.as_ref().is_some_and(|t| Arc::ptr_eq(t, &task));
            if !is_current || failed || task.cancel.is_cancelled() {
                continue;
            }
            if let Some(on_complete) = job.on_complete {
                let task = task.clone();
                self.dispatcher.dispatch(move || {
                    if task.is_live() {
                        on_complete();
                    }
                });
            }
        }
        debug!("Lookup worker stopped");
    }

    fn engine_for(&self, task: &Arc<Task>) -> SearchEngine {
        let handler: SharedHandler = Arc::new(DispatchingHandler {
            inner: self.handler.clone(),
            dispatcher: self.dispatcher.clone(),
            task: task.clone(),
        });
        match self.limit {
            Some(limit) => SearchEngine::with_limit(handler, limit),
            None => SearchEngine::new(handler),
        }
    }
}

/// Posts the events of one task to the designated context.
struct DispatchingHandler {
    inner: SharedHandler,
    dispatcher: Dispatcher,
    task: Arc<Task>,
}

impl DispatchingHandler {
    /// Post `f`, which runs only if `deliver` still holds on arrival.
    fn post<F>(&self, deliver: fn(&Task) -> bool, f: F)
    where
        F: FnOnce(&dyn ResultHandler, &Task) + Send + 'static,
    {
        let inner = self.inner.clone();
        let task = self.task.clone();
        let posted = self.dispatcher.dispatch(move || {
            if deliver(&task) {
                f(inner.as_ref(), &task);
            }
        });
        if !posted {
            warn!("Dispatch context is gone, dropping result event");
        }
    }
}

impl ResultHandler for DispatchingHandler {
    fn start(&self, start: &LookupStart) {
        let start = start.clone();
        self.post(Task::is_live, move |h, task| {
            task.started.store(true, Ordering::Release);
            h.start(&start);
        });
    }

    fn dictionary(&self, dictionary: &SharedDictionary) {
        let dictionary = dictionary.clone();
        self.post(Task::is_live, move |h, _| h.dictionary(&dictionary));
    }

    fn entry(&self, entry: &SharedEntry) {
        let entry = entry.clone();
        self.post(Task::is_live, move |h, _| h.entry(&entry));
    }

    fn exception(&self, error: &SearchError) {
        let error = error.clone();
        self.post(Task::is_live, move |h, _| h.exception(&error));
    }

    fn note(&self, note: &str) {
        let note = note.to_string();
        self.post(Task::is_live, move |h, _| h.note(&note));
    }

    fn end(&self) {
        self.post(Task::is_open, |h, _| h.end());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::lookup::dispatch::DispatchQueue;
    use crate::lookup::testing::{Event, RecordingHandler, TestDictionary};
    use crate::model::{SearchMode, SearchParameterKind};

    const TIMEOUT: Duration = Duration::from_secs(10);
    const WORDS: [&str; 8] = ["ka", "ki", "ku", "ke", "ko", "sa", "shi", "su"];

    fn slow_config() -> SearchConfiguration {
        let d1 = TestDictionary::new("d1", &["any"])
            .with_words(&WORDS)
            .with_delay(Duration::from_millis(50))
            .shared();
        SearchConfiguration::new(vec![SearchMode::any()], vec![d1], vec![])
    }

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = count.clone();
        let callback: Callback = Box::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn test_events_arrive_on_dispatch_context() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let d1 = TestDictionary::new("d1", &["any"]).with_words(&WORDS).shared();
        let config = SearchConfiguration::new(vec![SearchMode::any()], vec![d1], vec![]);
        let (completed, on_complete) = counter();

        engine.do_lookup(&config, Some(on_complete)).unwrap();
        assert!(queue.run_until(TIMEOUT, || completed.load(Ordering::SeqCst) == 1));

        assert_eq!(handler.words().len(), WORDS.len());
        assert_eq!(handler.events().last(), Some(&Event::End));
        let here = thread::current().id();
        assert!(handler.threads().iter().all(|t| *t == here));
    }

    #[test]
    fn test_superseded_lookup_never_completes() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let mut config = slow_config();
        let (first, first_done) = counter();
        let (second, second_done) = counter();

        engine.do_lookup(&config, Some(first_done)).unwrap();
        thread::sleep(Duration::from_millis(30));
        config.set_search_expression("s");
        engine.do_lookup(&config, Some(second_done)).unwrap();

        assert!(queue.run_until(TIMEOUT, || second.load(Ordering::SeqCst) == 1));
        queue.run_until(Duration::from_millis(100), || false);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        let words = handler.words();
        assert!(words.ends_with(&["sa".to_string(), "shi".to_string(), "su".to_string()]));
    }

    #[test]
    fn test_cancel_stops_lookup_and_still_ends() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let (completed, on_complete) = counter();

        engine.do_lookup(&slow_config(), Some(on_complete)).unwrap();
        assert!(queue.run_until(TIMEOUT, || !handler.words().is_empty()));
        engine.cancel();
        assert!(queue.run_until(TIMEOUT, || handler.count(&Event::End) == 1));
        queue.run_until(Duration::from_millis(50), || false);

        assert!(handler.words().len() < WORDS.len());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lookup_uses_snapshot_of_configuration() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let mut config = slow_config();
        config.set_search_expression("k");
        let (completed, on_complete) = counter();

        engine.do_lookup(&config, Some(on_complete)).unwrap();
        config.set_search_expression("zzz");
        assert!(queue.run_until(TIMEOUT, || completed.load(Ordering::SeqCst) == 1));

        assert_eq!(handler.events()[0], Event::Start("any \"k\"".into()));
        assert_eq!(handler.words().len(), 5);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let mut engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        engine.do_lookup(&slow_config(), None).unwrap();

        engine.dispose();
        engine.dispose();

        assert!(engine.is_disposed());
        let err = engine.do_lookup(&slow_config(), None).unwrap_err();
        assert!(matches!(err, LookupError::EngineDisposed));
    }

    #[test]
    fn test_with_limit() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::with_limit(handler.clone(), queue.dispatcher(), 3).unwrap();
        let d1 = TestDictionary::new("d1", &["any"]).with_words(&WORDS).shared();
        let config = SearchConfiguration::new(vec![SearchMode::any()], vec![d1], vec![]);
        let (completed, on_complete) = counter();

        engine.do_lookup(&config, Some(on_complete)).unwrap();
        assert!(queue.run_until(TIMEOUT, || completed.load(Ordering::SeqCst) == 1));

        assert_eq!(handler.words(), vec!["ka", "ki", "ku"]);
    }

    #[test]
    fn test_failed_lookup_reports_note_and_skips_completion() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let radical = SearchMode::new(
            "radical",
            "By radical",
            vec![SearchParameterKind::Custom("radical".into())],
        );
        let d1 = TestDictionary::new("d1", &["radical"]).shared();
        let config = SearchConfiguration::new(vec![radical], vec![d1], vec![]);
        let (completed, on_complete) = counter();

        engine.do_lookup(&config, Some(on_complete)).unwrap();
        assert!(queue.run_until(TIMEOUT, || handler.count(&Event::End) == 1));
        queue.run_until(Duration::from_millis(50), || false);

        let events = handler.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[1], Event::Note(note) if note.contains("radical")));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_abandoned_lookup_delivers_nothing_more() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let (completed, on_complete) = counter();

        engine.do_lookup(&slow_config(), Some(on_complete)).unwrap();
        thread::sleep(Duration::from_millis(80));
        engine.abandon();
        queue.run_until(Duration::from_millis(200), || false);

        assert!(handler.events().is_empty());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_finished_lookup_is_not_superseded() {
        let queue = DispatchQueue::new();
        let handler = RecordingHandler::shared();
        let engine = AsyncSearchEngine::new(handler.clone(), queue.dispatcher()).unwrap();
        let d1 = TestDictionary::new("d1", &["any"]).with_words(&WORDS).shared();
        let mut config = SearchConfiguration::new(vec![SearchMode::any()], vec![d1], vec![]);
        let (first, first_done) = counter();
        let (second, second_done) = counter();

        engine.do_lookup(&config, Some(first_done)).unwrap();
        // Let the worker finish without delivering anything yet.
        thread::sleep(Duration::from_millis(100));
        config.set_search_expression("s");
        engine.do_lookup(&config, Some(second_done)).unwrap();
        assert!(queue.run_until(TIMEOUT, || second.load(Ordering::SeqCst) == 1));

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(handler.count(&Event::End), 2);
    }
}
