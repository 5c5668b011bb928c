//! Bounded back/forward navigation over past lookups.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{LookupError, Result};

use super::configuration::SearchConfiguration;

/// Number of entries kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// A configuration snapshot together with caller-defined view state.
#[derive(Debug)]
pub struct HistoryEntry<V> {
    configuration: SearchConfiguration,
    view_state: V,
    recorded_at: DateTime<Utc>,
}

impl<V> HistoryEntry<V> {
    /// Snapshot `configuration`; later edits to it do not affect the entry.
    pub fn new(configuration: &SearchConfiguration, view_state: V) -> Self {
        Self {
            configuration: configuration.clone(),
            view_state,
            recorded_at: Utc::now(),
        }
    }

    pub fn configuration(&self) -> &SearchConfiguration {
        &self.configuration
    }

    pub fn view_state(&self) -> &V {
        &self.view_state
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Linear history with a cursor.
///
/// Adding an entry drops everything after the cursor; when full, the oldest
/// entry is evicted.
#[derive(Debug)]
pub struct SearchHistory<V> {
    entries: VecDeque<HistoryEntry<V>>,
    position: Option<usize>,
    capacity: usize,
}

impl<V> SearchHistory<V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// History holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            position: None,
            capacity,
        }
    }

    pub fn add_current_state(&mut self, entry: HistoryEntry<V>) {
        if let Some(position) = self.position {
            self.entries.truncate(position + 1);
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.position = Some(self.entries.len() - 1);
        trace!(position = self.entries.len() - 1, "History entry added");
    }

    /// Move the cursor one entry back and return that entry.
    pub fn back(&mut self) -> Result<&HistoryEntry<V>> {
        let position = self.position.ok_or(LookupError::EmptyHistory)?;
        if position == 0 {
            return Err(LookupError::HistoryAtStart);
        }
        self.position = Some(position - 1);
        self.entries
            .get(position - 1)
            .ok_or(LookupError::EmptyHistory)
    }

    /// Move the cursor one entry forward and return that entry.
    pub fn forward(&mut self) -> Result<&HistoryEntry<V>> {
        let position = self.position.ok_or(LookupError::EmptyHistory)?;
        if position + 1 >= self.entries.len() {
            return Err(LookupError::HistoryAtEnd);
        }
        self.position = Some(position + 1);
        self.entries
            .get(position + 1)
            .ok_or(LookupError::EmptyHistory)
    }

    pub fn can_go_back(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry<V>> {
        self.position.and_then(|p| self.entries.get(p))
    }

    /// Replace the entry under the cursor, e.g. to store an updated view state
    /// before navigating away.
    pub fn replace_current(&mut self, entry: HistoryEntry<V>) -> Result<()> {
        let slot = self
            .position
            .and_then(|p| self.entries.get_mut(p))
            .ok_or(LookupError::EmptyHistory)?;
        *slot = entry;
        Ok(())
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry<V>> {
        self.entries.iter()
    }
}

impl<V> Default for SearchHistory<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchMode;

    fn state(expression: &str) -> HistoryEntry<String> {
        let mut config = SearchConfiguration::new(SearchMode::standard(), vec![], vec![]);
        config.set_search_expression(expression);
        HistoryEntry::new(&config, format!("view-{expression}"))
    }

    fn expression(entry: &HistoryEntry<String>) -> String {
        entry.configuration().expression().to_string()
    }

    #[test]
    fn test_empty_history() {
        let mut history: SearchHistory<String> = SearchHistory::new();
        assert!(matches!(history.back(), Err(LookupError::EmptyHistory)));
        assert!(matches!(history.forward(), Err(LookupError::EmptyHistory)));
        assert!(history.current().is_none());
        assert!(!history.can_go_back());
    }

    #[test]
    fn test_oldest_entry_evicted_at_capacity() {
        let mut history = SearchHistory::new();
        for i in 1..=21 {
            history.add_current_state(state(&format!("s{i}")));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);

        let mut last = String::new();
        while history.can_go_back() {
            last = expression(history.back().unwrap());
        }

        assert_eq!(last, "s2");
        assert_eq!(history.position(), Some(0));
        assert!(matches!(history.back(), Err(LookupError::HistoryAtStart)));
    }

    #[test]
    fn test_add_truncates_forward_entries() {
        let mut history = SearchHistory::with_capacity(5);
        for name in ["a", "b", "c"] {
            history.add_current_state(state(name));
        }
        history.back().unwrap();
        history.back().unwrap();
        assert!(history.can_go_forward());

        history.add_current_state(state("d"));

        assert_eq!(history.len(), 2);
        assert!(!history.can_go_forward());
        assert!(matches!(history.forward(), Err(LookupError::HistoryAtEnd)));
        assert_eq!(expression(history.back().unwrap()), "a");
        assert_eq!(expression(history.forward().unwrap()), "d");
    }

    #[test]
    fn test_entries_are_snapshots() {
        let mut config = SearchConfiguration::new(SearchMode::standard(), vec![], vec![]);
        config.set_search_expression("before");
        let entry = HistoryEntry::new(&config, ());
        config.set_search_expression("after");

        assert_eq!(entry.configuration().expression(), "before");
    }

    #[test]
    fn test_replace_current() {
        let mut history = SearchHistory::new();
        history.add_current_state(state("a"));
        history.add_current_state(state("b"));

        history.replace_current(state("b2")).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().unwrap().view_state(), "view-b2");
    }

    #[test]
    fn test_capacity_at_least_one() {
        let mut history = SearchHistory::with_capacity(0);
        history.add_current_state(state("a"));
        history.add_current_state(state("b"));
        assert_eq!(history.capacity(), 1);
        assert_eq!(expression(history.current().unwrap()), "b");
    }

    #[test]
    fn test_entries_record_time_in_order() {
        let before = Utc::now();
        let mut history = SearchHistory::new();
        history.add_current_state(state("a"));
        history.add_current_state(state("b"));
        let after = Utc::now();

        let times: Vec<DateTime<Utc>> = history.iter().map(HistoryEntry::recorded_at).collect();
        assert!(times[0] >= before);
        assert!(times[0] <= times[1]);
        assert!(times[1] <= after);
    }
}
