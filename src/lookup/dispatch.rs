//! A designated execution context for result callbacks.
//!
//! Lookups run on a worker thread, but their results are usually consumed by
//! a single owner thread (a UI loop, the CLI main loop). A [`DispatchQueue`]
//! is that thread's inbox: workers post closures through a [`Dispatcher`],
//! and the owner runs them in posting order.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel as channel;
use tracing::debug;

/// A unit of work posted to the designated context.
pub type Callback = Box<dyn FnOnce() + Send>;

/// Posting side of a [`DispatchQueue`].
#[derive(Clone)]
pub struct Dispatcher {
    tx: channel::Sender<Callback>,
}

impl Dispatcher {
    /// Post a callback. Returns `false` if the queue no longer exists.
    pub fn dispatch<F>(&self, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(callback)).is_ok()
    }
}

/// Receiving side: the owner thread drains it.
pub struct DispatchQueue {
    tx: channel::Sender<Callback>,
    rx: channel::Receiver<Callback>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Run every callback posted so far. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(callback) = self.rx.try_recv() {
            callback();
            count += 1;
        }
        count
    }

    /// Run callbacks as they arrive until `done` returns `true` or `timeout`
    /// elapses. Returns whether `done` was reached.
    pub fn run_until<F>(&self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.rx.recv_timeout(remaining.min(Duration::from_millis(50))) {
                Ok(callback) => callback(),
                Err(channel::RecvTimeoutError::Timeout) => {}
                Err(channel::RecvTimeoutError::Disconnected) => return done(),
            }
        }
    }

    /// Move the queue onto its own thread, which runs callbacks until every
    /// dispatcher has been dropped.
    pub fn spawn(self, name: &str) -> io::Result<(Dispatcher, JoinHandle<()>)> {
        let dispatcher = self.dispatcher();
        let DispatchQueue { tx, rx } = self;
        drop(tx);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut count = 0usize;
            for callback in rx.iter() {
                callback();
                count += 1;
            }
            debug!(callbacks = count, "Dispatch thread finished");
        })?;
        Ok((dispatcher, handle))
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_callbacks_run_in_order() {
        let queue = DispatchQueue::new();
        let dispatcher = queue.dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let seen = seen.clone();
            assert!(dispatcher.dispatch(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(queue.run_pending(), 5);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn test_run_until_waits_for_worker() {
        let queue = DispatchQueue::new();
        let dispatcher = queue.dispatcher();
        let hits = Arc::new(AtomicUsize::new(0));
        let worker_hits = hits.clone();
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            dispatcher.dispatch(move || {
                worker_hits.fetch_add(1, Ordering::SeqCst);
            });
        });

        let done = queue.run_until(Duration::from_secs(5), || hits.load(Ordering::SeqCst) == 1);

        assert!(done);
        worker.join().unwrap();
    }

    #[test]
    fn test_run_until_times_out() {
        let queue = DispatchQueue::new();
        assert!(!queue.run_until(Duration::from_millis(10), || false));
    }

    #[test]
    fn test_spawned_queue_runs_on_own_thread() {
        let (dispatcher, handle) = DispatchQueue::new().spawn("dispatch-test").unwrap();
        let name = Arc::new(Mutex::new(None));
        let sink = name.clone();
        dispatcher.dispatch(move || {
            *sink.lock().unwrap() = thread::current().name().map(str::to_string);
        });
        drop(dispatcher);
        handle.join().unwrap();

        assert_eq!(name.lock().unwrap().as_deref(), Some("dispatch-test"));
    }

    #[test]
    fn test_dispatch_after_queue_dropped() {
        let queue = DispatchQueue::new();
        let dispatcher = queue.dispatcher();
        drop(queue);
        assert!(!dispatcher.dispatch(|| {}));
    }
}
