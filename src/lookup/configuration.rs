//! User-editable lookup configuration.
//!
//! Holds the selectable search modes, dictionaries and filters together with
//! the search parameters, and keeps their enabled state consistent with each
//! other. After every mutation one availability pass runs in a fixed order:
//!
//! 1. search modes: enabled iff every active dictionary supports the mode
//! 2. dictionaries: enabled iff the dictionary supports the selected mode
//! 3. filters: enabled iff some active dictionary accepts the filter
//! 4. search fields: union of the fields the active dictionaries support
//! 5. parameters: expression/distance enabled iff the selected mode uses them
//!
//! A dictionary is *active* when it is enabled and either all dictionaries are
//! selected or it is selected itself. Every public mutator fires at most one
//! [`ChangeEvent`] describing exactly the categories that changed.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::model::option::position_of;
use crate::model::{
    MatchMode, SearchField, SearchFieldSelection, SearchMode, SearchParameterKind,
    SelectableOption, SharedDictionary, SharedFilter,
};

use super::event::{ChangeEvent, ChangeSet};

/// Callback invoked synchronously for every change event.
pub type ChangeListener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle returned by [`SearchConfiguration::add_change_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Default search distance for distance modes.
pub const DEFAULT_DISTANCE: u32 = 1;

/// Target of a cross reference between dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTarget {
    /// Dictionary to search exclusively, if the reference names one.
    pub dictionary: Option<SharedDictionary>,
    /// Search mode to switch to.
    pub search_mode: Option<SearchMode>,
    /// Field selection to switch to.
    pub search_fields: Option<SearchFieldSelection>,
    /// Expression to look up.
    pub expression: String,
}

/// Search configuration state machine.
///
/// Not internally synchronized: mutate it from one thread only. Clones are
/// fully independent and start without listeners.
pub struct SearchConfiguration {
    search_modes: Vec<SelectableOption<SearchMode>>,
    dictionaries: Vec<SelectableOption<SharedDictionary>>,
    filters: Vec<SelectableOption<SharedFilter>>,
    all_dictionaries_selected: bool,
    multi_dictionary_mode: bool,
    multi_dictionary_selection: bool,
    search_fields: SearchFieldSelection,
    enabled_search_fields: SearchFieldSelection,
    expression: String,
    expression_enabled: bool,
    distance: u32,
    distance_enabled: bool,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener_id: u64,
    /// Change sets buffered while a batch is open.
    pending: Option<Vec<ChangeSet>>,
}

impl SearchConfiguration {
    /// Create a configuration with every dictionary enabled, all dictionaries
    /// selected and the first usable search mode selected.
    pub fn new(
        search_modes: Vec<SearchMode>,
        dictionaries: Vec<SharedDictionary>,
        filters: Vec<SharedFilter>,
    ) -> Self {
        let mut config = Self {
            search_modes: search_modes.into_iter().map(SelectableOption::new).collect(),
            dictionaries: dictionaries
                .into_iter()
                .enumerate()
                .map(|(i, d)| SelectableOption::with_state(d, i == 0, true))
                .collect(),
            filters: filters.into_iter().map(SelectableOption::new).collect(),
            all_dictionaries_selected: true,
            multi_dictionary_mode: false,
            multi_dictionary_selection: false,
            search_fields: SearchFieldSelection::new(true, true, true, MatchMode::Field),
            enabled_search_fields: SearchFieldSelection::none(),
            expression: String::new(),
            expression_enabled: false,
            distance: DEFAULT_DISTANCE,
            distance_enabled: false,
            listeners: Vec::new(),
            next_listener_id: 0,
            pending: None,
        };
        config.update_availability();
        config
    }

    // ── Search modes ────────────────────────────────────────────

    pub fn search_modes(&self) -> &[SelectableOption<SearchMode>] {
        &self.search_modes
    }

    pub fn search_mode_by_id(&self, id: &str) -> Option<&SearchMode> {
        self.search_modes
            .iter()
            .map(SelectableOption::value)
            .find(|m| m.id() == id)
    }

    /// The selected search mode, if it is also enabled.
    pub fn selected_search_mode(&self) -> Option<&SearchMode> {
        self.search_modes
            .iter()
            .find(|o| o.is_active())
            .map(SelectableOption::value)
    }

    pub fn select_search_mode(&mut self, mode: &SearchMode) -> Result<()> {
        let index = position_of(&self.search_modes, mode)
            .ok_or_else(|| ConfigurationError::UnknownSearchMode(mode.id().to_string()))?;
        if !self.search_modes[index].is_enabled() {
            return Err(ConfigurationError::SearchModeNotEnabled(mode.id().to_string()).into());
        }

        self.mutate(|c| {
            for (i, option) in c.search_modes.iter_mut().enumerate() {
                option.set_selected(i == index);
            }
        });
        Ok(())
    }

    // ── Dictionaries ────────────────────────────────────────────

    pub fn dictionaries(&self) -> &[SelectableOption<SharedDictionary>] {
        &self.dictionaries
    }

    pub fn dictionary_by_name(&self, name: &str) -> Option<&SharedDictionary> {
        self.dictionaries
            .iter()
            .map(SelectableOption::value)
            .find(|d| d.name() == name)
    }

    /// Whether `dictionary` takes part in a lookup (ignoring availability).
    pub fn is_dictionary_selected(&self, dictionary: &SharedDictionary) -> bool {
        self.all_dictionaries_selected
            || position_of(&self.dictionaries, dictionary)
                .is_some_and(|i| self.dictionaries[i].is_selected())
    }

    /// Dictionaries a lookup will query, in configuration order.
    pub fn selected_dictionaries(&self) -> Vec<SharedDictionary> {
        self.dictionaries
            .iter()
            .filter(|o| self.is_active_dictionary(o))
            .map(|o| o.value().clone())
            .collect()
    }

    pub fn is_all_dictionaries_selected(&self) -> bool {
        self.all_dictionaries_selected
    }

    pub fn is_multi_dictionary_mode(&self) -> bool {
        self.multi_dictionary_mode
    }

    /// More than one dictionary is individually selected.
    pub fn is_multi_dictionary_selection(&self) -> bool {
        self.multi_dictionary_selection
    }

    /// Whether dictionaries are currently queried as the sole target.
    pub fn is_exclusive(&self) -> bool {
        !(self.all_dictionaries_selected || self.multi_dictionary_selection)
    }

    pub fn select_dictionary(&mut self, dictionary: &SharedDictionary, select: bool) -> Result<()> {
        let index = position_of(&self.dictionaries, dictionary)
            .ok_or_else(|| ConfigurationError::UnknownDictionary(dictionary.name().to_string()))?;
        let option = &self.dictionaries[index];
        if option.is_selected() == select {
            return Ok(());
        }
        if select && !option.is_enabled() {
            return Err(ConfigurationError::DictionaryNotEnabled(dictionary.name().to_string()).into());
        }

        self.mutate(|c| {
            if select && !c.multi_dictionary_mode {
                for option in c.dictionaries.iter_mut() {
                    option.set_selected(false);
                }
            }
            c.dictionaries[index].set_selected(select);
            c.recompute_multi_selection();
        });
        Ok(())
    }

    pub fn select_all_dictionaries(&mut self, select: bool) {
        self.mutate(|c| c.all_dictionaries_selected = select);
    }

    /// Allow or forbid selecting more than one dictionary. Leaving multi
    /// dictionary mode keeps only the first selected dictionary.
    pub fn set_multi_dictionary_selection_mode(&mut self, multi: bool) {
        self.mutate(|c| {
            if !multi && c.multi_dictionary_selection {
                let mut seen = false;
                for option in c.dictionaries.iter_mut().filter(|o| o.is_selected()) {
                    if seen {
                        option.set_selected(false);
                    }
                    seen = true;
                }
                c.multi_dictionary_selection = false;
            }
            c.multi_dictionary_mode = multi;
        });
    }

    /// Replace the dictionary list.
    ///
    /// Dictionaries already known keep their state, new ones start unselected.
    /// When the list was empty before, the first new dictionary is selected.
    pub fn set_dictionaries(&mut self, dictionaries: Vec<SharedDictionary>) {
        self.mutate(|c| {
            let was_empty = c.dictionaries.is_empty();
            let mut replaced = Vec::with_capacity(dictionaries.len());
            for dictionary in dictionaries {
                let option = match position_of(&c.dictionaries, &dictionary) {
                    Some(i) => c.dictionaries[i].clone(),
                    None => SelectableOption::new(dictionary),
                };
                replaced.push(option);
            }
            c.dictionaries = replaced;
            c.recompute_multi_selection();

            if was_empty {
                if let Some(first) = c.dictionaries.first_mut() {
                    first.set_enabled(true);
                    first.set_selected(true);
                }
            }
        });
    }

    // ── Filters ─────────────────────────────────────────────────

    pub fn filters(&self) -> &[SelectableOption<SharedFilter>] {
        &self.filters
    }

    pub fn filter_by_name(&self, name: &str) -> Option<&SharedFilter> {
        self.filters
            .iter()
            .map(SelectableOption::value)
            .find(|f| f.name() == name)
    }

    /// Filters applied by a lookup: selected and enabled.
    pub fn selected_filters(&self) -> Vec<SharedFilter> {
        self.filters
            .iter()
            .filter(|o| o.is_active())
            .map(|o| o.value().clone())
            .collect()
    }

    pub fn select_filter(&mut self, filter: &SharedFilter, select: bool) -> Result<()> {
        let index = position_of(&self.filters, filter)
            .ok_or_else(|| ConfigurationError::UnknownFilter(filter.name().to_string()))?;
        let option = &self.filters[index];
        if option.is_selected() == select {
            return Ok(());
        }
        if select && !option.is_enabled() {
            return Err(ConfigurationError::FilterNotEnabled(filter.name().to_string()).into());
        }

        self.mutate(|c| c.filters[index].set_selected(select));
        Ok(())
    }

    // ── Search fields ───────────────────────────────────────────

    pub fn search_fields(&self) -> &SearchFieldSelection {
        &self.search_fields
    }

    pub fn enabled_search_fields(&self) -> &SearchFieldSelection {
        &self.enabled_search_fields
    }

    pub fn select_search_field(&mut self, field: SearchField, selected: bool) -> Result<()> {
        if self.search_fields.is_selected(field) == selected {
            return Ok(());
        }
        if selected && !self.enabled_search_fields.is_selected(field) {
            return Err(ConfigurationError::SearchFieldNotEnabled(field.to_string()).into());
        }

        self.mutate(|c| c.search_fields.select(field, selected));
        Ok(())
    }

    /// Select or deselect a match mode; the other match mode takes the opposite state.
    pub fn select_match_mode(&mut self, mode: MatchMode, selected: bool) -> Result<()> {
        if self.search_fields.is_match_mode_selected(mode) == selected {
            return Ok(());
        }
        let target = if selected { mode } else { mode.opposite() };
        if !self.enabled_search_fields.is_match_mode_selected(target) {
            return Err(ConfigurationError::MatchModeNotEnabled(target.to_string()).into());
        }

        self.mutate(|c| {
            c.search_fields.select_match_mode(mode, selected);
            c.search_fields.select_match_mode(mode.opposite(), !selected);
        });
        Ok(())
    }

    /// Replace the whole field selection.
    pub fn set_search_field_selection(&mut self, selection: SearchFieldSelection) {
        self.mutate(|c| c.search_fields = selection);
    }

    // ── Parameters ──────────────────────────────────────────────

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_expression_enabled(&self) -> bool {
        self.expression_enabled
    }

    pub fn set_search_expression(&mut self, expression: impl Into<String>) {
        let expression = expression.into();
        self.mutate(|c| c.expression = expression);
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn is_distance_enabled(&self) -> bool {
        self.distance_enabled
    }

    pub fn set_distance(&mut self, distance: u32) {
        self.mutate(|c| c.distance = distance);
    }

    // ── Grouped changes ─────────────────────────────────────────

    /// Run several mutations as one group.
    ///
    /// Events raised inside `f` are delivered when the group ends, all of them
    /// marked incomplete except the last. If `f` fails, the configuration is
    /// rolled back to its state before the call and no events are delivered.
    /// Nested groups join the outermost one.
    pub fn with_batch<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.pending.is_some() {
            return f(self);
        }

        let saved = self.clone();
        self.pending = Some(Vec::new());
        let result = f(self);
        let pending = self.pending.take().unwrap_or_default();

        match result {
            Ok(()) => {
                let last = pending.len().saturating_sub(1);
                for (i, changes) in pending.into_iter().enumerate() {
                    self.notify(&ChangeEvent::new(changes, i == last));
                }
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, discarded = pending.len(), "Rolling back grouped configuration change");
                self.assign_state(&saved);
                Err(e)
            }
        }
    }

    /// Jump to the target of a cross reference in one atomic step.
    pub fn follow_reference(&mut self, target: &ReferenceTarget) -> Result<()> {
        self.with_batch(|c| {
            // Switch the mode early when possible, the target dictionary may only
            // be enabled under it.
            if let Some(mode) = &target.search_mode {
                let enabled = c
                    .search_modes
                    .iter()
                    .any(|o| o.value() == mode && o.is_enabled());
                if enabled {
                    c.select_search_mode(mode)?;
                }
            }
            if let Some(dictionary) = &target.dictionary {
                c.select_all_dictionaries(false);
                let others: Vec<SharedDictionary> = c
                    .dictionaries
                    .iter()
                    .filter(|o| o.is_selected())
                    .map(|o| o.value().clone())
                    .collect();
                for other in &others {
                    c.select_dictionary(other, false)?;
                }
                c.select_dictionary(dictionary, true)?;
            }
            if let Some(mode) = &target.search_mode {
                c.select_search_mode(mode)?;
            }
            if let Some(fields) = target.search_fields {
                c.set_search_field_selection(fields);
            }
            c.set_search_expression(target.expression.clone());
            Ok(())
        })
    }

    /// Copy the state of `other` into this configuration, keeping the listeners.
    pub fn restore_from(&mut self, other: &SearchConfiguration) {
        self.mutate(|c| c.assign_state(other));
    }

    // ── Listeners ───────────────────────────────────────────────

    pub fn add_change_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    // ── Internals ───────────────────────────────────────────────

    fn is_active_dictionary(&self, option: &SelectableOption<SharedDictionary>) -> bool {
        option.is_enabled() && (self.all_dictionaries_selected || option.is_selected())
    }

    fn recompute_multi_selection(&mut self) {
        self.multi_dictionary_selection = self.multi_dictionary_mode
            && self.dictionaries.iter().filter(|o| o.is_selected()).count() > 1;
    }

    /// Apply `f`, run the availability pass and fire one event for the difference.
    fn mutate<F: FnOnce(&mut Self)>(&mut self, f: F) {
        let before = StateSnapshot::capture(self);
        f(self);
        self.update_availability();
        let changes = before.diff(&StateSnapshot::capture(self));
        self.fire(changes);
    }

    fn fire(&mut self, changes: ChangeSet) {
        if changes.is_empty() {
            return;
        }
        match self.pending.as_mut() {
            Some(pending) => pending.push(changes),
            None => self.notify(&ChangeEvent::new(changes, true)),
        }
    }

    fn notify(&self, event: &ChangeEvent) {
        debug!(changes = ?event.changes(), complete = event.is_complete(), "Configuration changed");
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    fn assign_state(&mut self, other: &SearchConfiguration) {
        self.search_modes = other.search_modes.clone();
        self.dictionaries = other.dictionaries.clone();
        self.filters = other.filters.clone();
        self.all_dictionaries_selected = other.all_dictionaries_selected;
        self.multi_dictionary_mode = other.multi_dictionary_mode;
        self.multi_dictionary_selection = other.multi_dictionary_selection;
        self.search_fields = other.search_fields;
        self.enabled_search_fields = other.enabled_search_fields;
        self.expression = other.expression.clone();
        self.expression_enabled = other.expression_enabled;
        self.distance = other.distance;
        self.distance_enabled = other.distance_enabled;
    }

    /// The availability cascade. Runs once, in fixed order.
    fn update_availability(&mut self) {
        let exclusive = self.is_exclusive();
        self.update_search_mode_availability(exclusive);
        self.update_dictionary_availability(exclusive);
        self.update_filter_availability();
        self.update_search_field_availability();
        self.update_parameter_availability();
    }

    fn update_search_mode_availability(&mut self, exclusive: bool) {
        let active: Vec<SharedDictionary> = self.selected_dictionaries();
        for option in self.search_modes.iter_mut() {
            let supported = active.iter().all(|d| d.supports(option.value(), exclusive));
            option.set_enabled(supported);
        }

        let has_selection = self.search_modes.iter().any(SelectableOption::is_active);
        if !has_selection {
            let fallback = self.search_modes.iter().position(SelectableOption::is_enabled);
            for (i, option) in self.search_modes.iter_mut().enumerate() {
                option.set_selected(Some(i) == fallback);
            }
            if let Some(i) = fallback {
                debug!(mode = %self.search_modes[i].value(), "Falling back to first enabled search mode");
            }
        }
    }

    fn update_dictionary_availability(&mut self, exclusive: bool) {
        let mode = self.selected_search_mode().cloned();
        let mut lost_selection = false;
        for option in self.dictionaries.iter_mut() {
            let supported = mode
                .as_ref()
                .map_or(true, |m| option.value().supports(m, exclusive));
            if !supported && option.is_selected() {
                option.set_selected(false);
                lost_selection = true;
            }
            option.set_enabled(supported);
        }

        if lost_selection && !self.dictionaries.iter().any(SelectableOption::is_selected) {
            if let Some(first) = self.dictionaries.iter_mut().find(|o| o.is_enabled()) {
                debug!(dictionary = first.value().name(), "Falling back to first enabled dictionary");
                first.set_selected(true);
            }
        }
        self.recompute_multi_selection();
    }

    fn update_filter_availability(&mut self) {
        let active = self.selected_dictionaries();
        for option in self.filters.iter_mut() {
            let usable = active.iter().any(|d| option.value().enable_for(d.as_ref()));
            if !usable {
                option.set_selected(false);
            }
            option.set_enabled(usable);
        }
    }

    fn update_search_field_availability(&mut self) {
        let mut enabled = SearchFieldSelection::none();
        if let Some(mode) = self.selected_search_mode() {
            if mode.requires(&SearchParameterKind::SearchFields) {
                for dictionary in self.selected_dictionaries() {
                    enabled = enabled.union(dictionary.supported_fields(mode));
                }
            }
        }
        self.enabled_search_fields = enabled;
    }

    fn update_parameter_availability(&mut self) {
        let (expression, distance) = match self.selected_search_mode() {
            Some(mode) => (
                mode.requires(&SearchParameterKind::Expression),
                mode.requires(&SearchParameterKind::Distance),
            ),
            None => (false, false),
        };
        self.expression_enabled = expression;
        self.distance_enabled = distance;
    }
}

impl Clone for SearchConfiguration {
    fn clone(&self) -> Self {
        Self {
            search_modes: self.search_modes.clone(),
            dictionaries: self.dictionaries.clone(),
            filters: self.filters.clone(),
            all_dictionaries_selected: self.all_dictionaries_selected,
            multi_dictionary_mode: self.multi_dictionary_mode,
            multi_dictionary_selection: self.multi_dictionary_selection,
            search_fields: self.search_fields,
            enabled_search_fields: self.enabled_search_fields,
            expression: self.expression.clone(),
            expression_enabled: self.expression_enabled,
            distance: self.distance,
            distance_enabled: self.distance_enabled,
            listeners: Vec::new(),
            next_listener_id: 0,
            pending: None,
        }
    }
}

impl fmt::Debug for SearchConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfiguration")
            .field("search_modes", &self.search_modes)
            .field("dictionaries", &self.dictionaries)
            .field("filters", &self.filters)
            .field("all_dictionaries_selected", &self.all_dictionaries_selected)
            .field("multi_dictionary_mode", &self.multi_dictionary_mode)
            .field("multi_dictionary_selection", &self.multi_dictionary_selection)
            .field("search_fields", &self.search_fields)
            .field("enabled_search_fields", &self.enabled_search_fields)
            .field("expression", &self.expression)
            .field("expression_enabled", &self.expression_enabled)
            .field("distance", &self.distance)
            .field("distance_enabled", &self.distance_enabled)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Comparable view of the state, used to compute the change set of a mutation.
#[derive(PartialEq)]
struct StateSnapshot {
    mode_selected: Vec<bool>,
    mode_enabled: Vec<bool>,
    dictionary_list: Vec<usize>,
    dictionary_selected: Vec<usize>,
    dictionary_enabled: Vec<usize>,
    all_dictionaries_selected: bool,
    multi_dictionary_mode: bool,
    filter_selected: Vec<bool>,
    filter_enabled: Vec<bool>,
    search_fields: SearchFieldSelection,
    enabled_search_fields: SearchFieldSelection,
    expression: String,
    distance: u32,
    expression_enabled: bool,
    distance_enabled: bool,
}

impl StateSnapshot {
    fn capture(config: &SearchConfiguration) -> Self {
        let key = |d: &SharedDictionary| Arc::as_ptr(d) as *const () as usize;
        let dictionaries_where = |pred: fn(&SelectableOption<SharedDictionary>) -> bool| {
            config
                .dictionaries
                .iter()
                .filter(|o| pred(o))
                .map(|o| key(o.value()))
                .collect::<Vec<_>>()
        };

        Self {
            mode_selected: config.search_modes.iter().map(|o| o.is_selected()).collect(),
            mode_enabled: config.search_modes.iter().map(|o| o.is_enabled()).collect(),
            dictionary_list: config.dictionaries.iter().map(|o| key(o.value())).collect(),
            dictionary_selected: dictionaries_where(SelectableOption::is_selected),
            dictionary_enabled: dictionaries_where(SelectableOption::is_enabled),
            all_dictionaries_selected: config.all_dictionaries_selected,
            multi_dictionary_mode: config.multi_dictionary_mode,
            filter_selected: config.filters.iter().map(|o| o.is_selected()).collect(),
            filter_enabled: config.filters.iter().map(|o| o.is_enabled()).collect(),
            search_fields: config.search_fields,
            enabled_search_fields: config.enabled_search_fields,
            expression: config.expression.clone(),
            distance: config.distance,
            expression_enabled: config.expression_enabled,
            distance_enabled: config.distance_enabled,
        }
    }

    fn diff(&self, after: &Self) -> ChangeSet {
        let mut changes = ChangeSet::empty();
        changes.set_if(
            ChangeSet::SEARCH_MODE_SELECTION,
            self.mode_selected != after.mode_selected,
        );
        changes.set_if(
            ChangeSet::SEARCH_MODE_AVAILABILITY,
            self.mode_enabled != after.mode_enabled,
        );
        changes.set_if(
            ChangeSet::DICTIONARY_LIST_CHANGED,
            self.dictionary_list != after.dictionary_list,
        );
        changes.set_if(
            ChangeSet::DICTIONARY_SELECTION,
            self.dictionary_selected != after.dictionary_selected
                || self.all_dictionaries_selected != after.all_dictionaries_selected,
        );
        changes.set_if(
            ChangeSet::DICTIONARY_AVAILABILITY,
            self.dictionary_enabled != after.dictionary_enabled,
        );
        changes.set_if(
            ChangeSet::MULTI_DICTIONARY_MODE,
            self.multi_dictionary_mode != after.multi_dictionary_mode,
        );
        changes.set_if(
            ChangeSet::FILTER_SELECTION,
            self.filter_selected != after.filter_selected,
        );
        changes.set_if(
            ChangeSet::FILTER_AVAILABILITY,
            self.filter_enabled != after.filter_enabled,
        );
        changes.set_if(
            ChangeSet::SEARCH_FIELDS_SELECTION,
            self.search_fields != after.search_fields,
        );
        changes.set_if(
            ChangeSet::SEARCH_FIELDS_AVAILABILITY,
            self.enabled_search_fields != after.enabled_search_fields,
        );
        changes.set_if(
            ChangeSet::SEARCH_PARAMETERS,
            self.expression != after.expression || self.distance != after.distance,
        );
        changes.set_if(
            ChangeSet::SEARCH_PARAMETERS_AVAILABILITY,
            self.expression_enabled != after.expression_enabled
                || self.distance_enabled != after.distance_enabled,
        );
        changes
    }
}
