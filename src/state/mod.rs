// State management module
//
// This module provides the StateManager which owns the published UiSnapshot plus the
// per-dimension request generations, behind a single RwLock. Every write goes through
// it, which makes it the single-writer funnel for the query-state controller.

use crate::models::{Book, BookCollection, LoadKind, UiSnapshot};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, watch};

/// Change events emitted when the snapshot is modified
///
/// Consumers that want "latest value" semantics should use
/// [`StateManager::watch`] instead; these events describe individual transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The search term was replaced
    QueryChanged { query: String },

    /// The combined loading flag flipped
    LoadingChanged { is_loading: bool },

    /// The result grid changed (`None` count means results were cleared)
    ResultsChanged { count: Option<usize> },

    /// A different book is shown in the detail view
    SelectionChanged { id: Option<String> },

    /// A request failed with a displayable message
    ErrorRaised { kind: LoadKind, message: String },

    /// A previously displayed error was cleared
    ErrorCleared,
}

/// Identifies one request of a given kind.
///
/// Only the ticket with the latest generation for its kind may publish a completion;
/// any earlier ticket is stale and its result is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: LoadKind,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Generations {
    search: u64,
    detail: u64,
}

impl Generations {
    fn bump(&mut self, kind: LoadKind) -> u64 {
        let slot = match kind {
            LoadKind::Search => &mut self.search,
            LoadKind::Detail => &mut self.detail,
        };
        *slot += 1;
        *slot
    }

    fn current(&self, kind: LoadKind) -> u64 {
        match kind {
            LoadKind::Search => self.search,
            LoadKind::Detail => self.detail,
        }
    }
}

#[derive(Debug)]
struct Inner {
    snapshot: UiSnapshot,
    generations: Generations,
}

/// Thread-safe owner of the published [`UiSnapshot`]
///
/// - Each mutation clones the current snapshot, applies the change and replaces it, so
///   readers only ever see complete values.
/// - The latest snapshot is published on a `watch` channel (replace-on-change).
/// - Transitions are diffed into [`StateChange`] events on a `broadcast` channel.
/// - Request generations live under the same lock as the snapshot, so checking a
///   [`RequestTicket`] and publishing its result is atomic.
pub struct StateManager {
    inner: Arc<RwLock<Inner>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,

    /// Latest snapshot for observers that only care about the current value
    snapshot_tx: Arc<watch::Sender<UiSnapshot>>,
}

impl StateManager {
    /// Create a new StateManager with an idle snapshot for `seed_query`
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new(seed_query: impl Into<String>) -> Self {
        let snapshot = UiSnapshot::with_query(seed_query);
        let (state_tx, _) = broadcast::channel(100);
        let (snapshot_tx, _) = watch::channel(snapshot.clone());

        Self {
            inner: Arc::new(RwLock::new(Inner {
                snapshot,
                generations: Generations::default(),
            })),
            state_tx,
            snapshot_tx: Arc::new(snapshot_tx),
        }
    }

    /// Get a copy of the current snapshot
    pub fn snapshot(&self) -> UiSnapshot {
        self.read(|s| s.clone())
    }

    /// Execute a function with read access to the current snapshot
    ///
    /// # Example
    /// ```ignore
    /// let loading = state_manager.read(|snapshot| snapshot.is_loading);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&UiSnapshot) -> R,
    {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner.snapshot)
    }

    /// Subscribe to the latest snapshot
    pub fn watch(&self) -> watch::Receiver<UiSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Apply an unconditional update and publish the result
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut UiSnapshot),
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        self.apply(&mut inner, update_fn)
    }

    /// Start a new request of `kind`, superseding any earlier one.
    ///
    /// Bumps the generation, marks the dimension in flight and applies `update_fn`
    /// in one critical section.
    pub fn begin_request<F>(&self, kind: LoadKind, update_fn: F) -> (RequestTicket, Vec<StateChange>)
    where
        F: FnOnce(&mut UiSnapshot),
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let generation = inner.generations.bump(kind);

        let changes = self.apply(&mut inner, |snapshot| {
            snapshot.set_in_flight(kind, true);
            update_fn(snapshot);
        });

        (RequestTicket { kind, generation }, changes)
    }

    /// Publish the completion of a request, unless it has been superseded.
    ///
    /// Returns `None` without touching the snapshot when `ticket` is stale.
    pub fn complete_request<F>(&self, ticket: &RequestTicket, update_fn: F) -> Option<Vec<StateChange>>
    where
        F: FnOnce(&mut UiSnapshot),
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.generations.current(ticket.kind) != ticket.generation {
            return None;
        }

        Some(self.apply(&mut inner, |snapshot| {
            update_fn(snapshot);
            snapshot.set_in_flight(ticket.kind, false);
        }))
    }

    /// Whether `ticket` is still the latest request of its kind
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.generations.current(ticket.kind) == ticket.generation
    }

    fn apply<F>(&self, inner: &mut Inner, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut UiSnapshot),
    {
        let mut next = inner.snapshot.clone();
        update_fn(&mut next);

        let changes = detect_changes(&inner.snapshot, &next);
        if changes.is_empty() {
            return changes;
        }

        inner.snapshot = next;
        self.snapshot_tx.send_replace(inner.snapshot.clone());

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    // Convenience methods for the controller

    /// Replace the search term
    pub fn set_query(&self, query: &str) -> Vec<StateChange> {
        self.update(|s| s.query = query.to_string())
    }

    /// Begin a search: results are cleared, the selection is left alone
    pub fn begin_search(&self, query: &str) -> (RequestTicket, Vec<StateChange>) {
        self.begin_request(LoadKind::Search, |s| {
            s.query = query.to_string();
            s.last_result = None;
            s.clear_error();
        })
    }

    pub fn finish_search(
        &self,
        ticket: &RequestTicket,
        result: BookCollection,
    ) -> Option<Vec<StateChange>> {
        self.complete_request(ticket, |s| {
            s.last_result = Some(result);
            s.clear_error();
        })
    }

    /// A failed search replaces the grid with the error
    pub fn fail_search(&self, ticket: &RequestTicket, message: String) -> Option<Vec<StateChange>> {
        self.complete_request(ticket, |s| {
            s.last_result = None;
            s.set_error(LoadKind::Search, message);
        })
    }

    /// Begin a detail lookup: results, the previous selection and any search error
    /// stay visible. Only an earlier lookup failure is cleared.
    pub fn begin_detail(&self) -> (RequestTicket, Vec<StateChange>) {
        self.begin_request(LoadKind::Detail, |s| {
            if s.error_origin == Some(LoadKind::Detail) {
                s.clear_error();
            }
        })
    }

    pub fn finish_detail(&self, ticket: &RequestTicket, book: Book) -> Option<Vec<StateChange>> {
        self.complete_request(ticket, |s| {
            s.selected_book = Some(book);
            s.clear_error();
        })
    }

    /// A failed lookup keeps both the grid and the previous selection
    pub fn fail_detail(&self, ticket: &RequestTicket, message: String) -> Option<Vec<StateChange>> {
        self.complete_request(ticket, |s| s.set_error(LoadKind::Detail, message))
    }
}

/// Detect what changed between two snapshots and generate events
fn detect_changes(old: &UiSnapshot, new: &UiSnapshot) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.query != new.query {
        changes.push(StateChange::QueryChanged {
            query: new.query.clone(),
        });
    }

    if old.is_loading != new.is_loading {
        changes.push(StateChange::LoadingChanged {
            is_loading: new.is_loading,
        });
    }

    if old.last_result != new.last_result {
        changes.push(StateChange::ResultsChanged {
            count: new.last_result.as_ref().map(|r| r.len()),
        });
    }

    if old.selected_book != new.selected_book {
        changes.push(StateChange::SelectionChanged {
            id: new.selected_book.as_ref().and_then(|b| b.id.clone()),
        });
    }

    if old.error != new.error || old.error_origin != new.error_origin {
        match (&new.error, new.error_origin) {
            (Some(message), Some(kind)) => changes.push(StateChange::ErrorRaised {
                kind,
                message: message.clone(),
            }),
            _ => changes.push(StateChange::ErrorCleared),
        }
    }

    // Flight flags only matter when they change is_loading or were the sole edit
    if changes.is_empty()
        && (old.search_in_flight != new.search_in_flight
            || old.detail_in_flight != new.detail_in_flight)
    {
        changes.push(StateChange::LoadingChanged {
            is_loading: new.is_loading,
        });
    }

    changes
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(crate::models::DEFAULT_SEED_QUERY)
    }
}

// Make StateManager cloneable for sharing across tasks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            state_tx: self.state_tx.clone(),
            snapshot_tx: Arc::clone(&self.snapshot_tx),
        }
    }
}
