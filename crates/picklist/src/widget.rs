//! The picklist widget: the selection/search state machine behind an
//! enhanced selection-list control.
//!
//! `PickList` is the single authority over option state. It owns the
//! [`OptionStore`], runs the search engine and the list navigator, and
//! announces every state change through typed signals so that any number of
//! presentation surfaces (search-result list, choice list, single-selection
//! header) can re-render from payloads alone without ever querying back.
//!
//! Views feed decoded input back as [`Intent`] values through
//! [`PickList::dispatch`]. The widget is single-threaded and cooperative:
//! every operation runs to completion, and the only suspension points are
//! the search debounce (driven through [`PickList::poll`]) and the remote
//! fetch, which completes before matching proceeds.
//!
//! # Example
//!
//! ```
//! use picklist::config::{PickListConfig, SelectMode};
//! use picklist::store::OptionSeed;
//! use picklist::widget::PickList;
//!
//! let mut list = PickList::new(
//!     SelectMode::Multi,
//!     vec![],
//!     vec![OptionSeed::new("Apple"), OptionSeed::new("Banana")],
//!     PickListConfig::default(),
//! )
//! .unwrap();
//!
//! list.option_selected.connect(|change| {
//!     println!("selected {:?}", change.option.text);
//! });
//!
//! list.initialize().unwrap();
//! list.select(1).unwrap();
//! assert_eq!(list.selected_values(), vec!["Banana".to_string()]);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use picklist_core::Signal;

use crate::config::{OnListEnd, PickListConfig, SelectMode};
use crate::error::{PickError, Result};
use crate::events::{OptionSnapshot, SelectionChange, SelectionSnapshot};
use crate::intent::Intent;
use crate::navigator::{self, ListEntry, Movement};
use crate::search::{self, FieldMapping, FilterDebouncer, RemoteSource, RequestCache};
use crate::store::{GroupIndex, GroupSeed, OptionIndex, OptionSeed, OptionStore};

/// Placeholder text of the synthetic empty sentinel.
const SENTINEL_PLACEHOLDER: &str = "Select an option";

/// A request to create an option at runtime.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    /// Display text. Must be non-empty and unique among active options.
    pub text: String,
    /// Submission value. Defaults to the text when absent.
    pub value: Option<String>,
    /// Select the option right after creating it.
    pub selected: bool,
    /// Persist the option immediately instead of marking it transient.
    pub persist: bool,
}

impl CreateRequest {
    /// Create a request with the given display text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the submission value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Select the option right after creating it.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Persist the option immediately.
    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }
}

/// State of the outside-click watcher.
///
/// Arming is deferred by one dispatch so the watcher never observes the
/// click that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatcherState {
    Disarmed,
    Arming,
    Armed,
}

/// The active keyword filter.
struct FilterState {
    keyword: String,
    matches: Vec<OptionIndex>,
    creator_visible: bool,
}

fn shift_index(index: OptionIndex, removed: OptionIndex) -> Option<OptionIndex> {
    if index == removed {
        None
    } else if index > removed {
        Some(index - 1)
    } else {
        Some(index)
    }
}

/// An enhanced selection-list control.
///
/// # Signals
///
/// - `option_selected(change)` / `option_deselected(change)`: a specific
///   selection change, with the resulting selection snapshot
/// - `changed(change)`: generic follow-up to either of the above
/// - `option_created(option)` / `option_removed((option, former_index))`
/// - `max_selected(())`: a selection was refused because the limit is reached
/// - `search_filtered((keyword, match_count))`: a filter pass completed
/// - `creator_toggled(Some(keyword) | None)`: the create-item affordance
///   became visible or hidden
/// - `group_toggled((group, collapsed))`
/// - `dropdown_opened(())` / `dropdown_closed(())`
/// - `container_activated(())` / `container_deactivated(())`
/// - `highlight_moved(movement)`: the result-list cursor moved
/// - `reset_completed(hard)`
pub struct PickList {
    mode: SelectMode,
    config: PickListConfig,
    store: OptionStore,

    remote: Option<Box<dyn RemoteSource>>,
    mapping: FieldMapping,
    request_cache: RequestCache,
    debouncer: FilterDebouncer,
    filter_state: Option<FilterState>,
    keyword: String,

    highlight: Option<ListEntry>,
    pointer_resync: Option<ListEntry>,
    choice_highlight: Vec<OptionIndex>,

    dropdown_open: bool,
    container_active: bool,
    blur_watcher: WatcherState,

    limit_suspended: bool,
    destroyed: bool,

    // Signals
    /// Emitted after an option was selected.
    pub option_selected: Signal<SelectionChange>,
    /// Emitted after an option was deselected.
    pub option_deselected: Signal<SelectionChange>,
    /// Emitted after an option was created at runtime.
    pub option_created: Signal<OptionSnapshot>,
    /// Emitted after an option was removed, with its former index.
    pub option_removed: Signal<(OptionSnapshot, OptionIndex)>,
    /// Generic follow-up to `option_selected`/`option_deselected`.
    pub changed: Signal<SelectionChange>,
    /// Emitted when a selection is refused because the limit is reached.
    pub max_selected: Signal<()>,
    /// Emitted after a filter pass, with the keyword and the match count.
    pub search_filtered: Signal<(String, usize)>,
    /// Emitted when the create-item affordance shows (with the keyword) or
    /// hides.
    pub creator_toggled: Signal<Option<String>>,
    /// Emitted after a group was collapsed or expanded.
    pub group_toggled: Signal<(GroupIndex, bool)>,
    /// Emitted when the dropdown opens.
    pub dropdown_opened: Signal<()>,
    /// Emitted when the dropdown closes.
    pub dropdown_closed: Signal<()>,
    /// Emitted when the container becomes active.
    pub container_activated: Signal<()>,
    /// Emitted when the container is deactivated.
    pub container_deactivated: Signal<()>,
    /// Emitted when the result-list highlight moves.
    pub highlight_moved: Signal<Movement<ListEntry>>,
    /// Emitted after a reset completed; the payload is the `hard` flag.
    pub reset_completed: Signal<bool>,
}

impl PickList {
    /// Build a widget over the given groups and options.
    ///
    /// The configuration is validated against the mode; unsupported
    /// combinations fail here with [`PickError::Configuration`]. In single
    /// mode with deselection allowed, an empty-valued sentinel is installed
    /// at index 0 unless the first option already has an empty value.
    ///
    /// Connect to the signals before calling [`initialize`](Self::initialize)
    /// so views observe the replay of the initial selection.
    pub fn new(
        mode: SelectMode,
        groups: Vec<GroupSeed>,
        options: Vec<OptionSeed>,
        config: PickListConfig,
    ) -> Result<Self> {
        config.validate(mode)?;

        let mut store = OptionStore::new(mode, groups, options)?;
        if mode == SelectMode::Single && config.single.allow_deselect {
            store.ensure_sentinel(SENTINEL_PLACEHOLDER);
        }
        store.capture_baselines();

        let delay = Duration::from_millis(config.search.delay_ms);
        Ok(Self {
            mode,
            config,
            store,
            remote: None,
            mapping: FieldMapping::default(),
            request_cache: RequestCache::new(),
            debouncer: FilterDebouncer::new(delay),
            filter_state: None,
            keyword: String::new(),
            highlight: None,
            pointer_resync: None,
            choice_highlight: Vec::new(),
            dropdown_open: false,
            container_active: false,
            blur_watcher: WatcherState::Disarmed,
            limit_suspended: false,
            destroyed: false,
            option_selected: Signal::new(),
            option_deselected: Signal::new(),
            option_created: Signal::new(),
            option_removed: Signal::new(),
            changed: Signal::new(),
            max_selected: Signal::new(),
            search_filtered: Signal::new(),
            creator_toggled: Signal::new(),
            group_toggled: Signal::new(),
            dropdown_opened: Signal::new(),
            dropdown_closed: Signal::new(),
            container_activated: Signal::new(),
            container_deactivated: Signal::new(),
            highlight_moved: Signal::new(),
            reset_completed: Signal::new(),
        })
    }

    /// Attach a remote search transport and its record mapping.
    pub fn set_remote_source(&mut self, source: impl RemoteSource + 'static, mapping: FieldMapping) {
        self.remote = Some(Box::new(source));
        self.mapping = mapping;
    }

    /// Attach a remote search transport using the builder pattern.
    pub fn with_remote_source(
        mut self,
        source: impl RemoteSource + 'static,
        mapping: FieldMapping,
    ) -> Self {
        self.set_remote_source(source, mapping);
        self
    }

    /// Apply the initial state: replay the selection from the option flags
    /// (emitting the usual selection events so views sync up), then apply
    /// the configured initial collapse and dropdown state.
    ///
    /// In multi mode an over-limit initial selection is first clamped by
    /// silently dropping the trailing excess; the limit is suspended during
    /// the replay itself.
    pub fn initialize(&mut self) -> Result<()> {
        self.ensure_alive()?;

        if self.mode == SelectMode::Multi
            && let Some(max) = self.config.multi.max_selected
        {
            let selected = self.store.selected_active();
            for &index in selected.iter().skip(max) {
                self.store.set_selected(index, false);
            }
        }

        self.limit_suspended = true;
        for index in self.store.selected_active() {
            let _ = self.select(index)?;
        }
        self.limit_suspended = false;

        self.clear_highlight();
        self.pointer_resync = None;

        if self.config.groups.allow_collapse && self.config.groups.collapse_on_init {
            for group in 0..self.store.group_count() {
                self.toggle_group(group, Some(true))?;
            }
        }
        if self.config.dropdown.open_after_init {
            self.open_dropdown()?;
        }
        Ok(())
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// The widget mode.
    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// The configuration.
    pub fn config(&self) -> &PickListConfig {
        &self.config
    }

    /// Read access to the option store.
    pub fn store(&self) -> &OptionStore {
        &self.store
    }

    /// Snapshots of the selected active options, in store order.
    pub fn selection(&self) -> SelectionSnapshot {
        self.store.selection_snapshot()
    }

    /// Values of the selected active options, in store order.
    pub fn selected_values(&self) -> Vec<String> {
        self.store
            .selected_active()
            .into_iter()
            .map(|index| self.store.options()[index].value.clone())
            .collect()
    }

    /// The currently highlighted result-list entry.
    pub fn highlighted(&self) -> Option<ListEntry> {
        self.highlight
    }

    /// Indexes of the highlighted choices.
    pub fn choice_highlighted(&self) -> &[OptionIndex] {
        &self.choice_highlight
    }

    /// The current search keyword, as last edited.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The active filter, as keyword and matching option indexes.
    pub fn filtered(&self) -> Option<(&str, &[OptionIndex])> {
        self.filter_state
            .as_ref()
            .map(|f| (f.keyword.as_str(), f.matches.as_slice()))
    }

    /// Whether the dropdown is open.
    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    /// Whether the container is active.
    pub fn is_container_active(&self) -> bool {
        self.container_active
    }

    /// Whether the widget has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Keywords already sent to the remote source.
    pub fn request_cache(&self) -> &RequestCache {
        &self.request_cache
    }

    /// Whether no further option can be selected.
    pub fn is_selection_limit_reached(&self) -> bool {
        self.mode == SelectMode::Multi
            && self
                .config
                .multi
                .max_selected
                .is_some_and(|max| self.store.selection_len() >= max)
    }

    /// Whether every non-disabled child of the group is selected.
    pub fn is_group_complete(&self, group: GroupIndex) -> Result<bool> {
        self.store.is_group_complete(group)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select the option at `index`.
    ///
    /// Returns `Ok(false)` without touching state when the selection limit
    /// is reached; the refusal is announced through `max_selected`. Selecting
    /// an already-selected option re-emits its events (initialization relies
    /// on this to replay the selection for views).
    pub fn select(&mut self, index: OptionIndex) -> Result<bool> {
        self.ensure_alive()?;
        if self.store.get(index).is_none() {
            return Err(PickError::OptionNotFound(index));
        }
        if !self.limit_suspended && self.is_selection_limit_reached() {
            tracing::debug!(target: "picklist::widget", index, "selection limit reached");
            self.max_selected.emit(());
            return Ok(false);
        }

        self.store.set_selected(index, true);
        tracing::debug!(target: "picklist::widget", index, "option selected");
        if let Some(option) = self.store.snapshot(index) {
            let change = SelectionChange {
                option,
                selection: self.store.selection_snapshot(),
            };
            self.option_selected.emit(change.clone());
            self.changed.emit(change);
        }

        if self.mode == SelectMode::Multi {
            // the selected entry may leave the candidate list, so the cursor
            // moves on to the next one, wrapping at the end
            self.move_highlight(true, OnListEnd::Rerun);
        }
        if self.config.dropdown.close_after_change && self.dropdown_open {
            self.close_dropdown()?;
        }
        Ok(true)
    }

    /// Deselect the option at `index`.
    ///
    /// A no-op returning `Ok(false)` when the option is not selected; no
    /// duplicate events are emitted. In single mode the first entry (the
    /// sentinel, when present) is re-selected afterwards so the backing
    /// collection never shows a selected-nothing state.
    pub fn deselect(&mut self, index: OptionIndex) -> Result<bool> {
        self.ensure_alive()?;
        if !self.store.option(index)?.selected {
            return Ok(false);
        }

        self.store.set_selected(index, false);
        self.choice_highlight.retain(|&i| i != index);
        tracing::debug!(target: "picklist::widget", index, "option deselected");
        if let Some(option) = self.store.snapshot(index) {
            let change = SelectionChange {
                option,
                selection: self.store.selection_snapshot(),
            };
            self.option_deselected.emit(change.clone());
            self.changed.emit(change);
        }

        if self.mode == SelectMode::Single && !self.store.is_empty() {
            self.select(0)?;
        }
        Ok(true)
    }

    /// Deselect every highlighted choice.
    pub fn deselect_highlighted_choices(&mut self) -> Result<()> {
        self.ensure_alive()?;
        for index in std::mem::take(&mut self.choice_highlight) {
            self.deselect(index)?;
        }
        Ok(())
    }

    // =========================================================================
    // Creation and removal
    // =========================================================================

    /// Create a new option at the end of the store.
    ///
    /// Fails with [`PickError::EmptyLabel`] on an empty text and with
    /// [`PickError::DuplicateLabel`] when an active option already carries
    /// exactly this text. The option is transient unless `persist` is set,
    /// and is auto-selected when the request or the `select_created`
    /// configuration says so.
    pub fn create(&mut self, request: CreateRequest) -> Result<OptionIndex> {
        self.ensure_alive()?;
        if request.text.is_empty() {
            return Err(PickError::EmptyLabel);
        }
        if self.store.active_has_text(&request.text) {
            return Err(PickError::DuplicateLabel(request.text));
        }

        let value = request.value.unwrap_or_else(|| request.text.clone());
        let index = self.store.create(request.text, value, request.persist);
        tracing::debug!(target: "picklist::widget", index, "option created");
        if let Some(snapshot) = self.store.snapshot(index) {
            self.option_created.emit(snapshot);
        }

        if request.selected || self.config.create_items.select_created {
            let _ = self.select(index)?;
        }
        Ok(index)
    }

    /// Remove the option at `index`.
    ///
    /// Every subsequent option shifts down by one; group child lists, the
    /// highlight cursors and the active filter are all updated to match. A
    /// group left empty (or empty of eligible children, under the
    /// exclude-disabled policy) is removed along with it.
    pub fn remove(&mut self, index: OptionIndex) -> Result<()> {
        self.ensure_alive()?;
        let Some(snapshot) = self.store.snapshot(index) else {
            return Err(PickError::OptionNotFound(index));
        };

        let (_, removed_group) = self
            .store
            .remove(index, self.config.results.exclude_disabled)?;
        self.repair_after_removal(index, removed_group);
        tracing::debug!(target: "picklist::widget", index, "option removed");
        self.option_removed.emit((snapshot, index));
        Ok(())
    }

    fn repair_after_removal(&mut self, index: OptionIndex, removed_group: Option<GroupIndex>) {
        let repair_entry = |entry: ListEntry| -> Option<ListEntry> {
            match entry {
                ListEntry::Option(i) => shift_index(i, index).map(ListEntry::Option),
                ListEntry::Group(g) => match removed_group {
                    Some(removed) if g == removed => None,
                    Some(removed) if g > removed => Some(ListEntry::Group(g - 1)),
                    _ => Some(ListEntry::Group(g)),
                },
                ListEntry::Creator => Some(ListEntry::Creator),
            }
        };

        self.highlight = self.highlight.and_then(repair_entry);
        self.pointer_resync = self.pointer_resync.and_then(repair_entry);
        self.choice_highlight = self
            .choice_highlight
            .iter()
            .filter_map(|&i| shift_index(i, index))
            .collect();
        if let Some(filter) = &mut self.filter_state {
            filter.matches = filter
                .matches
                .iter()
                .filter_map(|&i| shift_index(i, index))
                .collect();
        }
    }

    /// Promote every transient option to persisted.
    pub fn save_new_items(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.store.persist_transients();
        Ok(())
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Restore the backed-up flags of all persisted options and discard the
    /// transient ones, then re-apply initialization. With `hard`, flags are
    /// forced to their defaults (unselected, enabled) instead.
    pub fn reset(&mut self, hard: bool) -> Result<()> {
        self.reset_with(hard, false)
    }

    /// [`reset`](Self::reset), optionally suppressing the `reset_completed`
    /// signal.
    pub fn reset_with(&mut self, hard: bool, silent: bool) -> Result<()> {
        self.ensure_alive()?;

        // transient options go first, from the end so indexes stay valid
        let mut transients = self.store.transient_indices();
        transients.reverse();
        for index in transients {
            self.remove(index)?;
        }

        self.store.restore_baselines(hard);
        self.keyword.clear();
        self.debouncer.cancel();
        self.filter_state = None;
        self.choice_highlight.clear();
        self.clear_highlight();

        self.initialize()?;
        tracing::debug!(target: "picklist::widget", hard, "reset applied");
        if !silent {
            self.reset_completed.emit(hard);
        }
        Ok(())
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Run the keyword filter immediately, bypassing the debounce.
    ///
    /// With remote search enabled the option set is first extended from the
    /// remote source — unless the keyword was already fetched and caching is
    /// on, or unless `force_remote` overrides the cache. Transport failures
    /// never abort the local matching that follows.
    ///
    /// An empty keyword clears the filter instead of matching.
    pub fn filter(&mut self, keyword: &str, force_remote: bool) -> Result<()> {
        self.ensure_alive()?;
        if keyword.is_empty() {
            self.clear_filter(true);
            return Ok(());
        }

        let remote_enabled = self.config.search.remote.enabled;
        let remote_cached = self.config.search.remote.cache;
        if remote_enabled
            && (force_remote || !remote_cached || !self.request_cache.contains(keyword))
        {
            self.fetch_remote(keyword);
        }

        let mut matches = search::match_indices(&self.store, &self.config.search, keyword);
        if self.config.results.ignore_selected {
            matches.retain(|&index| !self.store.options()[index].selected);
        }

        let exact_match = self.store.active_has_text_ci(keyword);
        let creator_visible = self.config.create_items.enabled && !exact_match;
        let text_matches = matches.len();
        let match_count = if creator_visible && self.config.results.creator_matches {
            text_matches + 1
        } else {
            text_matches
        };
        self.filter_state = Some(FilterState {
            keyword: keyword.to_string(),
            matches,
            creator_visible,
        });

        tracing::debug!(target: "picklist::search", keyword, match_count, "filter applied");
        self.search_filtered.emit((keyword.to_string(), match_count));
        if self.config.create_items.enabled {
            self.creator_toggled
                .emit(creator_visible.then(|| keyword.to_string()));
        }

        // a highlight the filter hid cannot stay
        if let Some(entry) = self.highlight
            && !self.candidates().contains(&entry)
        {
            self.clear_highlight();
        }
        if self.config.results.force_highlight && self.highlight.is_none() && text_matches > 0 {
            self.move_highlight(true, OnListEnd::Stop);
        }
        Ok(())
    }

    /// Drop the active filter. With `preserve_highlight` the cursor
    /// survives; otherwise it is cleared along with the filter.
    pub fn clear_filter(&mut self, preserve_highlight: bool) {
        if self.filter_state.take().is_some() {
            tracing::trace!(target: "picklist::search", "filter cleared");
        }
        if !preserve_highlight {
            self.clear_highlight();
        }
        if self.config.create_items.enabled {
            self.creator_toggled.emit(None);
        }
    }

    fn fetch_remote(&mut self, keyword: &str) {
        let Some(url) = self.config.search.remote.url.clone() else {
            return;
        };
        let fetched = match self.remote.as_mut() {
            Some(remote) => remote.fetch(&url, keyword),
            None => return,
        };
        let records = match fetched {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(
                    target: "picklist::search",
                    keyword,
                    error = %err,
                    "remote search failed; matching continues over known options"
                );
                return;
            }
        };
        tracing::debug!(
            target: "picklist::search",
            keyword,
            records = records.len(),
            "remote records received"
        );

        // records whose fully-mapped attribute set already exists among the
        // current options are discarded
        let mut known: HashSet<BTreeMap<String, String>> = self
            .store
            .options()
            .iter()
            .map(|entry| self.mapping.project_option(entry))
            .collect();

        for record in records {
            let mapped = self.mapping.apply(&record);
            if known.contains(&mapped) {
                continue;
            }
            let Some(text) = mapped.get("text").cloned() else {
                tracing::warn!(target: "picklist::search", "skipping remote record without text");
                continue;
            };
            let value = mapped.get("value").cloned();
            let request = CreateRequest {
                text,
                value,
                selected: false,
                persist: true,
            };
            match self.create(request) {
                Ok(_) => {
                    known.insert(mapped);
                }
                Err(err) => {
                    tracing::warn!(target: "picklist::search", error = %err, "skipping remote record");
                }
            }
        }

        self.request_cache.record(keyword);
    }

    /// Run a pending debounced filter if its delay has elapsed.
    ///
    /// Returns whether a filter ran.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        self.ensure_alive()?;
        if let Some(keyword) = self.debouncer.take_due(now) {
            self.filter(&keyword, false)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Time remaining until the pending debounced filter is due, if any.
    pub fn time_until_pending_filter(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_until_due(now)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The ordered result-list entries currently eligible for highlighting:
    /// group headers (when collapsible), visible enabled options that pass
    /// the active filter, and the create-item affordance.
    pub fn candidates(&self) -> Vec<ListEntry> {
        let mut entries = Vec::new();
        let mut seen_groups: HashSet<GroupIndex> = HashSet::new();

        for index in self.store.active_indices() {
            if !self.option_is_candidate(index) {
                continue;
            }
            if let Some(group) = self.store.options()[index].group {
                if seen_groups.insert(group) && self.config.groups.allow_collapse {
                    entries.push(ListEntry::Group(group));
                }
                if self.store.groups()[group].collapsed {
                    continue;
                }
            }
            entries.push(ListEntry::Option(index));
        }

        if self.filter_state.as_ref().is_some_and(|f| f.creator_visible) {
            entries.push(ListEntry::Creator);
        }
        entries
    }

    fn option_is_candidate(&self, index: OptionIndex) -> bool {
        if self.store.is_option_disabled(index) {
            return false;
        }
        match &self.filter_state {
            Some(filter) => filter.matches.contains(&index),
            None => true,
        }
    }

    /// Move the result-list highlight one step.
    pub fn move_highlight(&mut self, forward: bool, on_end: OnListEnd) -> Movement<ListEntry> {
        let candidates = self.candidates();
        let movement = navigator::move_highlight(&candidates, self.highlight, forward, on_end);
        self.highlight = movement.moved_to;
        if movement.changed() {
            // once keyboard movement pulls the highlight away, the next
            // pointer motion over the departed entry wins it back
            if let (Some(from), Some(_)) = (movement.moved_from, movement.moved_to) {
                self.pointer_resync = Some(from);
            }
            self.highlight_moved.emit(movement);
        }
        movement
    }

    /// The choices currently eligible for the choice-list cursor: selected
    /// active options that are neither fixed nor disabled, in store order.
    pub fn choice_candidates(&self) -> Vec<OptionIndex> {
        self.store
            .selected_active()
            .into_iter()
            .filter(|&index| {
                !self.store.options()[index].fixed && !self.store.is_option_disabled(index)
            })
            .collect()
    }

    /// Move the choice-list highlight one step. The movement starts from the
    /// most recently highlighted choice and leaves exactly the target
    /// highlighted.
    pub fn move_choice_highlight(&mut self, forward: bool, on_end: OnListEnd) -> Movement<OptionIndex> {
        let candidates = self.choice_candidates();
        let current = self.choice_highlight.last().copied();
        let movement = navigator::move_highlight(&candidates, current, forward, on_end);
        self.choice_highlight.clear();
        if let Some(to) = movement.moved_to {
            self.choice_highlight.push(to);
        }
        movement
    }

    fn set_highlight(&mut self, to: Option<ListEntry>) {
        let from = self.highlight;
        if from != to {
            self.highlight = to;
            self.highlight_moved.emit(Movement {
                moved_from: from,
                moved_to: to,
            });
        }
    }

    fn clear_highlight(&mut self) {
        self.set_highlight(None);
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Collapse or expand a group. Without an explicit state the current one
    /// is inverted. Collapsed children stay selected but leave the candidate
    /// list.
    pub fn toggle_group(&mut self, group: GroupIndex, collapsed: Option<bool>) -> Result<bool> {
        self.ensure_alive()?;
        let state = collapsed.unwrap_or(!self.store.group(group)?.collapsed);
        self.store.set_collapsed(group, state);
        tracing::debug!(target: "picklist::widget", group, collapsed = state, "group toggled");
        self.group_toggled.emit((group, state));

        if state
            && let Some(ListEntry::Option(index)) = self.highlight
            && self.store.options()[index].group == Some(group)
        {
            self.clear_highlight();
        }
        Ok(state)
    }

    // =========================================================================
    // Dropdown and container
    // =========================================================================

    /// Open the dropdown. Refused (with a `max_selected` signal) when the
    /// selection limit is reached and the configuration blocks opening.
    pub fn open_dropdown(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if self.dropdown_open {
            return Ok(());
        }
        if self.mode == SelectMode::Multi
            && self.config.multi.block_dropdown_on_limit
            && self.is_selection_limit_reached()
        {
            self.max_selected.emit(());
            return Ok(());
        }

        self.dropdown_open = true;
        if self.config.dropdown.reset_after_close {
            self.clear_highlight();
            if self.mode == SelectMode::Single
                && let Some(&index) = self.store.selected_active().first()
                && self.candidates().contains(&ListEntry::Option(index))
            {
                self.set_highlight(Some(ListEntry::Option(index)));
            }
        }
        self.dropdown_opened.emit(());
        Ok(())
    }

    /// Close the dropdown, clearing the keyword and filter when the
    /// configuration asks for it.
    pub fn close_dropdown(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if !self.dropdown_open {
            return Ok(());
        }
        if self.config.dropdown.reset_after_close {
            self.keyword.clear();
            self.debouncer.cancel();
            self.clear_filter(false);
        }
        self.dropdown_open = false;
        self.dropdown_closed.emit(());
        Ok(())
    }

    /// Open or close the dropdown; without an explicit state the current one
    /// is inverted.
    pub fn toggle_dropdown(&mut self, state: Option<bool>) -> Result<()> {
        if state.unwrap_or(!self.dropdown_open) {
            self.open_dropdown()
        } else {
            self.close_dropdown()
        }
    }

    /// Activate the container and open the dropdown. The outside-click
    /// watcher arms in a deferred step: it only becomes live once the
    /// dispatch that armed it completes, so it never observes the
    /// activating click itself.
    pub fn activate(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if !self.container_active {
            self.container_active = true;
            self.container_activated.emit(());
        }
        if self.blur_watcher == WatcherState::Disarmed {
            self.blur_watcher = WatcherState::Arming;
        }
        self.open_dropdown()
    }

    /// Deactivate the container, disarm the watcher and close the dropdown.
    pub fn deactivate(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.blur_watcher = WatcherState::Disarmed;
        if self.container_active {
            self.container_active = false;
            self.container_deactivated.emit(());
        }
        self.close_dropdown()
    }

    // =========================================================================
    // Intent dispatch
    // =========================================================================

    /// Dispatch a decoded user intent, stamped with the current time.
    pub fn dispatch(&mut self, intent: Intent) -> Result<bool> {
        self.dispatch_at(intent, Instant::now())
    }

    /// Dispatch a decoded user intent at an explicit point in time (the time
    /// only matters for keyword edits, which schedule the debounced filter).
    ///
    /// Returns whether the intent had any effect.
    pub fn dispatch_at(&mut self, intent: Intent, now: Instant) -> Result<bool> {
        self.ensure_alive()?;
        // captured at entry: the watcher must not fire for the dispatch
        // that armed it
        let watcher_live = self.blur_watcher == WatcherState::Armed;

        let handled = match intent {
            Intent::ArrowKey { forward, ctrl } => self.on_arrow(forward, ctrl)?,
            Intent::EnterKey => self.on_enter()?,
            Intent::EscapeKey => {
                self.close_dropdown()?;
                true
            }
            Intent::BackspaceKey { search_empty } => self.on_backspace(search_empty),
            Intent::KeywordEdited(keyword) => {
                self.on_keyword(keyword, now);
                true
            }
            Intent::PointerEnter(entry) => self.on_pointer_enter(entry),
            Intent::PointerLeave(entry) => {
                if self.highlight == Some(entry) {
                    self.clear_highlight();
                    true
                } else {
                    false
                }
            }
            Intent::PointerMove(entry) => {
                if self.pointer_resync == Some(entry) {
                    self.pointer_resync = None;
                    self.on_pointer_enter(entry)
                } else {
                    false
                }
            }
            Intent::ClickEntry(entry) => {
                if self.candidates().contains(&entry) {
                    self.activate_entry(entry)?
                } else {
                    false
                }
            }
            Intent::ClickHeader => {
                self.toggle_dropdown(None)?;
                true
            }
            Intent::ClickChoice { index, ctrl } => self.on_click_choice(index, ctrl),
            Intent::ClickChoiceRemove(index) => self.on_click_choice_remove(index)?,
            Intent::ClickOutside => {
                if watcher_live {
                    self.on_outside_click()?;
                    true
                } else {
                    false
                }
            }
            Intent::Activate => {
                self.activate()?;
                true
            }
            Intent::Deactivate => {
                self.deactivate()?;
                true
            }
        };

        if self.blur_watcher == WatcherState::Arming {
            self.blur_watcher = WatcherState::Armed;
        }
        Ok(handled)
    }

    fn on_arrow(&mut self, forward: bool, ctrl: bool) -> Result<bool> {
        if !self.dropdown_open {
            if forward {
                self.open_dropdown()?;
                return Ok(true);
            }
            return Ok(false);
        }
        if ctrl {
            if let Some(ListEntry::Group(group)) = self.highlight {
                self.toggle_group(group, Some(!forward))?;
                return Ok(true);
            }
            return Ok(false);
        }
        // forward movement circulates through the list; backward movement
        // lets the highlight disappear past the top
        let on_end = if forward {
            OnListEnd::Rerun
        } else {
            OnListEnd::Clear
        };
        self.move_highlight(forward, on_end);
        Ok(true)
    }

    fn on_enter(&mut self) -> Result<bool> {
        if !self.dropdown_open {
            return Ok(false);
        }
        match self.highlight {
            Some(entry) => self.activate_entry(entry),
            None => Ok(false),
        }
    }

    fn on_backspace(&mut self, search_empty: bool) -> bool {
        if !search_empty
            || self.mode != SelectMode::Multi
            || !self.config.multi.switch_to_choices_on_backspace
        {
            return false;
        }
        let movement = self.move_choice_highlight(false, OnListEnd::Rerun);
        movement.moved_to.is_some()
    }

    fn on_keyword(&mut self, keyword: String, now: Instant) {
        if !self.config.search.enabled || keyword == self.keyword {
            return;
        }
        self.keyword = keyword.clone();
        if keyword.chars().count() < self.config.search.min_length {
            // below the minimum the filter is cleared, not matched against
            // zero results; any pending filter is discarded outright
            self.debouncer.cancel();
            if self.filter_state.is_some() {
                self.clear_filter(true);
            }
        } else {
            self.debouncer.schedule(keyword, now);
        }
    }

    fn on_pointer_enter(&mut self, entry: ListEntry) -> bool {
        if !self.candidates().contains(&entry) {
            return false;
        }
        self.pointer_resync = None;
        self.set_highlight(Some(entry));
        true
    }

    fn activate_entry(&mut self, entry: ListEntry) -> Result<bool> {
        match entry {
            ListEntry::Option(index) => {
                self.select(index)?;
                Ok(true)
            }
            ListEntry::Group(group) => {
                self.toggle_group(group, None)?;
                Ok(true)
            }
            ListEntry::Creator => {
                self.create_from_keyword()?;
                Ok(true)
            }
        }
    }

    fn create_from_keyword(&mut self) -> Result<()> {
        let keyword = match &self.filter_state {
            Some(filter) => filter.keyword.clone(),
            None => self.keyword.clone(),
        };
        if keyword.is_empty() {
            return Ok(());
        }
        let index = self.create(CreateRequest::new(keyword))?;
        if let Some(filter) = &mut self.filter_state {
            filter.creator_visible = false;
            filter.matches.push(index);
        }
        if self.config.create_items.enabled {
            self.creator_toggled.emit(None);
        }
        self.set_highlight(Some(ListEntry::Option(index)));
        Ok(())
    }

    fn on_click_choice(&mut self, index: OptionIndex, ctrl: bool) -> bool {
        let Some(entry) = self.store.get(index) else {
            return false;
        };
        if !entry.selected || entry.fixed || self.store.is_option_disabled(index) {
            return false;
        }
        if ctrl {
            if let Some(pos) = self.choice_highlight.iter().position(|&i| i == index) {
                self.choice_highlight.remove(pos);
            } else {
                self.choice_highlight.push(index);
            }
        } else if self.choice_highlight.as_slice() == [index] {
            self.choice_highlight.clear();
        } else {
            self.choice_highlight.clear();
            self.choice_highlight.push(index);
        }
        true
    }

    fn on_click_choice_remove(&mut self, index: OptionIndex) -> Result<bool> {
        let Some(entry) = self.store.get(index) else {
            return Ok(false);
        };
        // fixed choices cannot leave the choice view
        if entry.fixed {
            return Ok(false);
        }
        self.deselect(index)
    }

    fn on_outside_click(&mut self) -> Result<()> {
        if self.config.dropdown.close_on_blur {
            self.deactivate()
        } else {
            self.blur_watcher = WatcherState::Disarmed;
            if self.container_active {
                self.container_active = false;
                self.container_deactivated.emit(());
            }
            self.clear_highlight();
            Ok(())
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Destroy the widget. All signal connections are dropped and every
    /// subsequent operation fails with [`PickError::Destroyed`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        tracing::debug!(target: "picklist::widget", "widget destroyed");

        self.option_selected.disconnect_all();
        self.option_deselected.disconnect_all();
        self.option_created.disconnect_all();
        self.option_removed.disconnect_all();
        self.changed.disconnect_all();
        self.max_selected.disconnect_all();
        self.search_filtered.disconnect_all();
        self.creator_toggled.disconnect_all();
        self.group_toggled.disconnect_all();
        self.dropdown_opened.disconnect_all();
        self.dropdown_closed.disconnect_all();
        self.container_activated.disconnect_all();
        self.container_deactivated.disconnect_all();
        self.highlight_moved.disconnect_all();
        self.reset_completed.disconnect_all();
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(PickError::Destroyed)
        } else {
            Ok(())
        }
    }
}
