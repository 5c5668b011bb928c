//! Centralized error types for dictlookup.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dictlookup library.
#[derive(Error, Debug)]
pub enum LookupError {
    /// A selection was rejected by the search configuration. State is unchanged.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A search mode declares a parameter kind the engine cannot resolve.
    #[error("Search mode '{mode}' declares unrecognized parameter kind '{kind}'")]
    UnrecognizedParameterKind { mode: String, kind: String },

    /// A lookup was started while no search mode is selected.
    #[error("No search mode is selected")]
    NoSearchMode,

    /// Replay was requested on a cache with nothing recorded.
    #[error("Result cache is empty")]
    EmptyCache,

    /// History navigation went past the oldest entry.
    #[error("Already at the oldest history entry")]
    HistoryAtStart,

    /// History navigation went past the newest entry.
    #[error("Already at the newest history entry")]
    HistoryAtEnd,

    /// The history holds no entries.
    #[error("History is empty")]
    EmptyHistory,

    /// The asynchronous engine was disposed and accepts no more lookups.
    #[error("Lookup engine has been disposed")]
    EngineDisposed,

    /// The lookup worker thread could not be started.
    #[error("Failed to start lookup worker: {0}")]
    Worker(std::io::Error),

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A word list line could not be parsed.
    #[error("Invalid word list '{path}' at line {line}: {reason}")]
    InvalidWordList {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The character encoding is not supported.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// A dictionary search failed outside of a result stream.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Rejected selections on a [`SearchConfiguration`](crate::lookup::SearchConfiguration).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unknown search mode '{0}'")]
    UnknownSearchMode(String),

    #[error("Search mode '{0}' is not enabled")]
    SearchModeNotEnabled(String),

    #[error("Unknown dictionary '{0}'")]
    UnknownDictionary(String),

    #[error("Dictionary '{0}' is not enabled")]
    DictionaryNotEnabled(String),

    #[error("Unknown result filter '{0}'")]
    UnknownFilter(String),

    #[error("Result filter '{0}' is not enabled")]
    FilterNotEnabled(String),

    #[error("Search field '{0}' is not enabled")]
    SearchFieldNotEnabled(String),

    #[error("Match mode '{0}' is not enabled")]
    MatchModeNotEnabled(String),
}

/// Failures reported by dictionaries while a lookup runs.
///
/// These are delivered through [`ResultHandler::exception`](crate::lookup::ResultHandler::exception)
/// and recorded by the result cache, so they must be cheap to clone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The dictionary could not start the search at all.
    #[error("Search in dictionary '{dictionary}' failed: {reason}")]
    Dictionary { dictionary: String, reason: String },

    /// A single result entry could not be produced.
    #[error("Dictionary entry could not be read: {reason}")]
    Entry { reason: String },

    /// A recorded entry reference no longer resolves.
    #[error("Stale entry reference: {reason}")]
    StaleReference { reason: String },
}

/// Convenience alias for `Result<T, LookupError>`.
pub type Result<T> = std::result::Result<T, LookupError>;

impl LookupError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a rejected configuration selection.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
