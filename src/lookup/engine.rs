//! Synchronous lookup execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::{LookupError, Result};
use crate::model::{SearchParameter, SearchParameterKind};

use super::configuration::SearchConfiguration;
use super::handler::{LookupStart, SharedHandler};

/// Cooperative cancellation flag, checked before every result entry.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Counters of a finished lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupSummary {
    /// Entries reported to the handler.
    pub entries: usize,
    /// Dictionaries whose search was started.
    pub dictionaries: usize,
    /// Errors reported through `exception`.
    pub errors: usize,
    /// The entry limit stopped the lookup.
    pub limit_reached: bool,
    pub cancelled: bool,
}

/// Runs a configuration against its selected dictionaries and streams the
/// results to a handler.
pub struct SearchEngine {
    handler: SharedHandler,
    limit: Option<usize>,
}

impl SearchEngine {
    /// Engine without an entry limit.
    pub fn new(handler: SharedHandler) -> Self {
        Self {
            handler,
            limit: None,
        }
    }

    /// Engine that stops after `limit` reported entries in total.
    pub fn with_limit(handler: SharedHandler, limit: usize) -> Self {
        Self {
            handler,
            limit: Some(limit),
        }
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn execute(&self, config: &SearchConfiguration) -> Result<LookupSummary> {
        self.execute_cancellable(config, &CancellationFlag::new())
    }

    /// Run a lookup, aborting early once `cancel` is set.
    ///
    /// `end` is emitted exactly once, also when the lookup is cancelled or
    /// fails with an error. A fatal error is reported through `note` before
    /// `end` and returned.
    pub fn execute_cancellable(
        &self,
        config: &SearchConfiguration,
        cancel: &CancellationFlag,
    ) -> Result<LookupSummary> {
        self.handler
            .start(&LookupStart::Configuration(Arc::new(config.clone())));
        let _end = EndGuard(&self.handler);

        let result = self.run(config, cancel);
        if let Err(e) = &result {
            warn!(error = %e, "Lookup aborted");
            self.handler.note(&e.to_string());
        }
        result
    }

    fn run(&self, config: &SearchConfiguration, cancel: &CancellationFlag) -> Result<LookupSummary> {
        let mode = config.selected_search_mode().ok_or(LookupError::NoSearchMode)?;
        let parameters = resolve_parameters(config)?;
        let filters = config.selected_filters();
        let limit = self.limit.unwrap_or(usize::MAX);

        debug!(
            mode = %mode,
            expression = config.expression(),
            filters = filters.len(),
            "Starting lookup"
        );

        let mut summary = LookupSummary::default();
        'dictionaries: for dictionary in config.selected_dictionaries() {
            if summary.entries >= limit {
                summary.limit_reached = true;
                break;
            }
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            self.handler.dictionary(&dictionary);
            summary.dictionaries += 1;

            let results = match dictionary.search(mode, &parameters) {
                Ok(results) => results,
                Err(e) => {
                    warn!(dictionary = dictionary.name(), error = %e, "Dictionary search failed");
                    self.handler.exception(&e);
                    summary.errors += 1;
                    continue;
                }
            };

            for result in results {
                if cancel.is_cancelled() {
                    summary.cancelled = true;
                    break 'dictionaries;
                }
                match result {
                    Ok(entry) => {
                        if !filters.iter().all(|f| f.accept(entry.as_ref())) {
                            trace!(word = entry.word(), "Entry rejected by filter");
                            continue;
                        }
                        self.handler.entry(&entry);
                        summary.entries += 1;
                        if summary.entries >= limit {
                            summary.limit_reached = true;
                            break 'dictionaries;
                        }
                    }
                    Err(e) => {
                        debug!(dictionary = dictionary.name(), error = %e, "Skipping unreadable entry");
                        self.handler.exception(&e);
                        summary.errors += 1;
                    }
                }
            }
        }

        debug!(
            entries = summary.entries,
            dictionaries = summary.dictionaries,
            errors = summary.errors,
            cancelled = summary.cancelled,
            "Lookup finished"
        );
        Ok(summary)
    }
}

/// Emits `end` when dropped, whatever path leaves the lookup.
struct EndGuard<'a>(&'a SharedHandler);

impl Drop for EndGuard<'_> {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// Positional parameter values for the selected mode.
pub fn resolve_parameters(config: &SearchConfiguration) -> Result<Vec<SearchParameter>> {
    let mode = config.selected_search_mode().ok_or(LookupError::NoSearchMode)?;
    mode.parameters()
        .iter()
        .map(|kind| match kind {
            SearchParameterKind::Expression => {
                Ok(SearchParameter::Expression(config.expression().to_string()))
            }
            SearchParameterKind::SearchFields => {
                Ok(SearchParameter::SearchFields(*config.search_fields()))
            }
            SearchParameterKind::Distance => Ok(SearchParameter::Distance(config.distance())),
            SearchParameterKind::Custom(name) => Err(LookupError::UnrecognizedParameterKind {
                mode: mode.id().to_string(),
                kind: name.clone(),
            }),
        })
        .collect()
}
