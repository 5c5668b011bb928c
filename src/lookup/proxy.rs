//! Fan-out of result events to several handlers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::SearchError;
use crate::model::{SharedDictionary, SharedEntry};

use super::handler::{LookupStart, ResultHandler, SharedHandler};

/// Forwards every event to each registered handler, in registration order.
///
/// Handlers are compared by identity when removed. The handler list may be
/// changed while events flow; an event goes to the handlers registered when
/// it arrived.
#[derive(Default)]
pub struct ResultProxy {
    handlers: RwLock<Vec<SharedHandler>>,
}

impl ResultProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(handlers: Vec<SharedHandler>) -> Self {
        Self {
            handlers: RwLock::new(handlers),
        }
    }

    pub fn add_handler(&self, handler: SharedHandler) {
        self.write().push(handler);
    }

    /// Returns `false` if `handler` was not registered.
    pub fn remove_handler(&self, handler: &SharedHandler) -> bool {
        let mut handlers = self.write();
        let target = Arc::as_ptr(handler) as *const ();
        match handlers
            .iter()
            .position(|h| Arc::as_ptr(h) as *const () == target)
        {
            Some(i) => {
                handlers.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear_handlers(&self) {
        self.write().clear();
    }

    pub fn handler_count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<SharedHandler>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<SharedHandler>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn each(&self, f: impl Fn(&dyn ResultHandler)) {
        let handlers = self.read().clone();
        for handler in &handlers {
            f(handler.as_ref());
        }
    }
}

impl ResultHandler for ResultProxy {
    fn start(&self, start: &LookupStart) {
        self.each(|h| h.start(start));
    }

    fn dictionary(&self, dictionary: &SharedDictionary) {
        self.each(|h| h.dictionary(dictionary));
    }

    fn entry(&self, entry: &SharedEntry) {
        self.each(|h| h.entry(entry));
    }

    fn exception(&self, error: &SearchError) {
        self.each(|h| h.exception(error));
    }

    fn note(&self, note: &str) {
        self.each(|h| h.note(note));
    }

    fn end(&self) {
        self.each(|h| h.end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::testing::{entry, Event, RecordingHandler};

    #[test]
    fn test_forwards_to_all_handlers_in_order() {
        let a = RecordingHandler::shared();
        let b = RecordingHandler::shared();
        let proxy = ResultProxy::with_handlers(vec![a.clone() as SharedHandler, b.clone()]);

        proxy.start(&LookupStart::Description("kanji".into()));
        proxy.entry(&entry("d1", "木"));
        proxy.note("done");
        proxy.end();

        let expected = vec![
            Event::Start("kanji".into()),
            Event::Entry("木".into()),
            Event::Note("done".into()),
            Event::End,
        ];
        assert_eq!(a.events(), expected);
        assert_eq!(b.events(), expected);
    }

    #[test]
    fn test_remove_by_identity() {
        let a = RecordingHandler::shared();
        let a_shared: SharedHandler = a.clone();
        let other: SharedHandler = RecordingHandler::shared();
        let proxy = ResultProxy::new();
        proxy.add_handler(a_shared.clone());

        assert!(!proxy.remove_handler(&other));
        assert!(proxy.remove_handler(&a_shared));
        assert_eq!(proxy.handler_count(), 0);

        proxy.end();
        assert!(a.events().is_empty());
    }
}
