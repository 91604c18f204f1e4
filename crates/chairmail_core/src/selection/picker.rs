//! Search-as-you-type picker dialogs for entities and lists.
//!
//! # Responsibility
//! - Debounce free-text input before running the search engine.
//! - Turn search hits into rows with highlighted field segments.
//! - Fall back to the full collection when the query is blank.
//!
//! # Invariants
//! - Every keystroke restarts the debounce timer.
//! - Closing the dialog drops results and cancels the pending search.
//! - Rows disabled because of a checked list cannot be toggled.

use crate::model::entity::Entity;
use crate::model::mailing_list::MailingList;
use crate::search::engine::{MatchSpan, SearchField, SearchHit, Searchable};
use crate::search::highlight::{highlight_segments, merge_spans, Segment};
use crate::store::{EntityStore, StoreResult};
use log::debug;
use std::time::{Duration, Instant};

/// Delay between the last keystroke and the search.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(250);

/// Restartable single-shot timer carrying the latest input value.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(Instant, String)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the timer at `now`.
    pub fn schedule(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((now + self.delay, value.into()));
    }

    /// Takes the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((deadline, _)) if now >= *deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|(_, value)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

/// Collection a picker operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    Entities,
    Lists,
}

/// Field value split into highlighted segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedField<'s> {
    pub field: SearchField,
    pub segments: Vec<Segment<'s>>,
}

/// One clickable row of the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRow<'s> {
    pub id: &'s str,
    pub label: &'s str,
    /// Shown as checked: explicitly checked, or disabled by a checked list.
    pub checked: bool,
    pub disabled: bool,
    pub fields: Vec<HighlightedField<'s>>,
}

/// Rendered picker content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerView<'s> {
    Rows(Vec<PickerRow<'s>>),
    NothingFound,
}

/// State of one picker dialog.
#[derive(Debug, Clone)]
pub struct PickerDialog {
    target: PickerTarget,
    open: bool,
    query: String,
    /// Query the current `results` were computed for.
    searched_query: String,
    debouncer: Debouncer,
    results: Vec<(String, Vec<MatchSpan>)>,
}

impl PickerDialog {
    pub fn new(target: PickerTarget, delay: Duration) -> Self {
        Self {
            target,
            open: false,
            query: String::new(),
            searched_query: String::new(),
            debouncer: Debouncer::new(delay),
            results: Vec::new(),
        }
    }

    pub fn target(&self) -> PickerTarget {
        self.target
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Opens the dialog with an empty query. No-op when already open.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        self.query.clear();
        self.searched_query.clear();
        self.results.clear();
    }

    /// Closes the dialog, dropping results and any pending search.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.searched_query.clear();
        self.results.clear();
        self.debouncer.cancel();
    }

    /// Records a keystroke; the search runs on a later [`Self::poll`].
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        if !self.open {
            return;
        }
        let value = value.into();
        self.query = value.clone();
        self.debouncer.schedule(value, now);
    }

    /// Runs the pending search if the debounce delay elapsed.
    ///
    /// Returns whether a search ran.
    pub fn poll(&mut self, now: Instant, store: &EntityStore) -> bool {
        if !self.open {
            return false;
        }
        match self.debouncer.poll(now) {
            Some(value) => {
                self.search_now(&value, store);
                true
            }
            None => false,
        }
    }

    /// Searches immediately, bypassing the debounce timer.
    pub fn search_now(&mut self, value: &str, store: &EntityStore) {
        self.query = value.to_string();
        self.searched_query = value.to_string();
        self.results = match self.target {
            PickerTarget::Entities => collect_results(store.search_entities(value)),
            PickerTarget::Lists => collect_results(store.search_lists(value)),
        };
        debug!(
            "event=picker_search module=selection status=ok target={:?} hits={}",
            self.target,
            self.results.len()
        );
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Renders search results, or the whole collection for a blank query.
    ///
    /// Keyed off the last query searched, so typing ahead of the debounced
    /// search keeps the previous rows.
    pub fn render<'s>(&self, store: &'s EntityStore) -> PickerView<'s> {
        let rows = if !self.results.is_empty() {
            self.results
                .iter()
                .filter_map(|(id, matches)| self.row(store, id, matches))
                .collect::<Vec<_>>()
        } else if self.searched_query.trim().is_empty() {
            match self.target {
                PickerTarget::Entities => store
                    .entities()
                    .iter()
                    .map(|entity| entity_row(store, entity, &[]))
                    .collect(),
                PickerTarget::Lists => store
                    .lists()
                    .iter()
                    .map(|list| list_row(list, &[]))
                    .collect(),
            }
        } else {
            Vec::new()
        };

        if rows.is_empty() {
            PickerView::NothingFound
        } else {
            PickerView::Rows(rows)
        }
    }

    /// Toggles the clicked row's item. Disabled rows are ignored.
    ///
    /// Returns the new checked flag, or `None` when the click was ignored.
    pub fn click(&self, id: &str, store: &mut EntityStore) -> StoreResult<Option<bool>> {
        match self.target {
            PickerTarget::Entities => {
                if store.is_part_of_checked_list(id) {
                    return Ok(None);
                }
                store.toggle_entity(id).map(Some)
            }
            PickerTarget::Lists => store.toggle_list(id).map(Some),
        }
    }

    fn row<'s>(&self, store: &'s EntityStore, id: &str, matches: &[MatchSpan]) -> Option<PickerRow<'s>> {
        match self.target {
            PickerTarget::Entities => store
                .entity(id)
                .map(|entity| entity_row(store, entity, matches)),
            PickerTarget::Lists => store.list(id).map(|list| list_row(list, matches)),
        }
    }
}

fn collect_results<T: Searchable>(
    hits: Vec<SearchHit<'_, T>>,
) -> Vec<(String, Vec<MatchSpan>)> {
    hits.into_iter()
        .map(|hit| (hit.item.search_id().to_string(), hit.matches))
        .collect()
}

fn entity_row<'s>(store: &EntityStore, entity: &'s Entity, matches: &[MatchSpan]) -> PickerRow<'s> {
    let disabled = store.is_part_of_checked_list(entity.id.as_str());
    PickerRow {
        id: entity.id.as_str(),
        label: entity.display_label(),
        checked: entity.checked || disabled,
        disabled,
        fields: highlighted_fields(entity, matches),
    }
}

fn list_row<'s>(list: &'s MailingList, matches: &[MatchSpan]) -> PickerRow<'s> {
    PickerRow {
        id: list.id.as_str(),
        label: list.display_label.as_str(),
        checked: list.checked,
        disabled: false,
        fields: highlighted_fields(list, matches),
    }
}

fn highlighted_fields<'s, T: Searchable>(item: &'s T, matches: &[MatchSpan]) -> Vec<HighlightedField<'s>> {
    item.search_fields()
        .into_iter()
        .map(|(field, value)| HighlightedField {
            field,
            segments: highlight_segments(value, &merge_spans(matches, field)),
        })
        .collect()
}
