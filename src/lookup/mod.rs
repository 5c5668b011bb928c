//! The lookup core: configuration state machine, search engines, result
//! distribution and navigation history.

pub mod async_engine;
pub mod cache;
pub mod configuration;
pub mod dispatch;
pub mod engine;
pub mod event;
pub mod handler;
pub mod history;
pub mod proxy;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use async_engine::AsyncSearchEngine;
pub use cache::ResultCache;
pub use configuration::{ListenerId, ReferenceTarget, SearchConfiguration, DEFAULT_DISTANCE};
pub use dispatch::{Callback, DispatchQueue, Dispatcher};
pub use engine::{CancellationFlag, LookupSummary, SearchEngine};
pub use event::{ChangeEvent, ChangeSet};
pub use handler::{LookupStart, ResultHandler, SharedHandler};
pub use history::{HistoryEntry, SearchHistory, DEFAULT_HISTORY_CAPACITY};
pub use proxy::ResultProxy;
pub use session::{LookupSession, SessionSettings};
