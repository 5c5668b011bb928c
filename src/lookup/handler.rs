//! The result event protocol.
//!
//! A lookup reports its progress as a stream of events:
//! `start`, then any mix of `dictionary`, `entry`, `exception` and `note`,
//! then exactly one `end`.

use std::sync::Arc;

use crate::error::SearchError;
use crate::model::{SharedDictionary, SharedEntry};

use super::configuration::SearchConfiguration;

/// What a lookup was started with.
#[derive(Debug, Clone)]
pub enum LookupStart {
    /// Free text, used when results were supplied directly.
    Description(String),
    /// Snapshot of the configuration the lookup ran with.
    Configuration(Arc<SearchConfiguration>),
}

impl LookupStart {
    /// Short human readable summary.
    pub fn summary(&self) -> String {
        match self {
            Self::Description(text) => text.clone(),
            Self::Configuration(config) => match config.selected_search_mode() {
                Some(mode) => format!("{} \"{}\"", mode.id(), config.expression()),
                None => format!("\"{}\"", config.expression()),
            },
        }
    }
}

/// Receiver of result events.
///
/// Implementations are shared between the lookup worker and the receiving
/// context, so all methods take `&self`.
pub trait ResultHandler: Send + Sync {
    fn start(&self, start: &LookupStart);

    /// Results from `dictionary` follow.
    fn dictionary(&self, dictionary: &SharedDictionary);

    fn entry(&self, entry: &SharedEntry);

    /// A recoverable failure. The lookup continues.
    fn exception(&self, error: &SearchError);

    fn note(&self, note: &str);

    /// Always the last event of a lookup, also after cancellation.
    fn end(&self);
}

pub type SharedHandler = Arc<dyn ResultHandler>;
