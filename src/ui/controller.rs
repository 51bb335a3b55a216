// Query-State Controller - mediates between user intents and the catalog client
//
// This module contains the QueryController which:
// - Owns the current search term
// - Starts catalog requests on tokio tasks and keeps their handles
// - Aborts the previous request of the same kind when a new one starts
// - Publishes results through the StateManager, discarding stale completions
// - Converts every client failure into a displayable message

use crate::metrics::Metrics;
use crate::models::{Book, BookCollection, LoadKind, UiSnapshot};
use crate::services::{CatalogClient, CatalogError};
use crate::state::{RequestTicket, StateChange, StateManager};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Controller that turns presentation intents into catalog requests and snapshots
///
/// All writes to the published [`UiSnapshot`] go through the shared
/// [`StateManager`]; the presentation layer only reads snapshots and sends intents
/// ([`set_query`](Self::set_query), [`select_book`](Self::select_book)).
///
/// Supersession is enforced twice: starting a request aborts the previous task of the
/// same kind, and each completion carries a [`RequestTicket`] that the state manager
/// rejects once a newer request exists. The second check covers a task that has already
/// resumed from the client call when it gets aborted.
///
/// # Example
/// ```ignore
/// let client: Arc<dyn CatalogClient> = Arc::new(GoogleBooksClient::new(&settings)?);
/// let controller = QueryController::new(client, StateManager::new("jazz history"), handle);
///
/// controller.set_query("jazz");
/// controller.set_query("jazz history"); // aborts the "jazz" request
///
/// let mut rx = controller.subscribe();
/// rx.wait_for(|s| !s.is_loading).await?;
/// ```
pub struct QueryController {
    client: Arc<dyn CatalogClient>,

    state_manager: StateManager,

    metrics: Arc<Metrics>,

    runtime: tokio::runtime::Handle,

    /// Delay before a search reaches the client; zero sends one request per edit
    debounce: Duration,

    current_query: Mutex<String>,

    search_task: Mutex<Option<JoinHandle<()>>>,

    detail_task: Mutex<Option<JoinHandle<()>>>,
}

impl QueryController {
    /// Create a controller seeded with the query held by `state_manager`
    ///
    /// # Arguments
    /// * `client` - Catalog client used for every request
    /// * `state_manager` - Owner of the published snapshot
    /// * `runtime` - Handle used to spawn request tasks
    pub fn new(
        client: Arc<dyn CatalogClient>,
        state_manager: StateManager,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let seed = state_manager.read(|s| s.query.clone());
        tracing::info!("Query controller initialized with seed query '{}'", seed);

        Self {
            client,
            state_manager,
            metrics: Arc::new(Metrics::new()),
            runtime,
            debounce: Duration::ZERO,
            current_query: Mutex::new(seed),
            search_task: Mutex::new(None),
            detail_task: Mutex::new(None),
        }
    }

    /// Wait `debounce` before each search reaches the client
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Replace the search term and search for it immediately
    pub fn set_query(&self, query: impl Into<String>) -> RequestTicket {
        let query = query.into();
        let mut slot = self.search_task.lock().unwrap_or_else(PoisonError::into_inner);
        self.current_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone_from(&query);
        self.start_search(&mut slot, &query)
    }

    /// Re-run the search for the current term
    pub fn search_current(&self) -> RequestTicket {
        let mut slot = self.search_task.lock().unwrap_or_else(PoisonError::into_inner);
        let query = self.current_query();
        self.start_search(&mut slot, &query)
    }

    /// Search the catalog, superseding any search still in flight.
    ///
    /// The loading snapshot is published before this returns; the result arrives later
    /// on the snapshot channel.
    pub fn search(&self, query: &str) -> RequestTicket {
        let mut slot = self.search_task.lock().unwrap_or_else(PoisonError::into_inner);
        self.start_search(&mut slot, query)
    }

    // The caller holds the search slot, which orders begin/spawn/abort and the
    // current_query write across callers
    fn start_search(&self, slot: &mut Option<JoinHandle<()>>, query: &str) -> RequestTicket {
        let (ticket, _) = self.state_manager.begin_search(query);
        self.metrics.record_started(LoadKind::Search);
        tracing::debug!("Search #{} started: '{}'", ticket.generation, query);

        let client = Arc::clone(&self.client);
        let state = self.state_manager.clone();
        let metrics = Arc::clone(&self.metrics);
        let debounce = self.debounce;
        let query = query.to_string();

        let handle = self.runtime.spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }

            let started = Instant::now();
            let outcome = client.search_books(&query).await;
            publish_search(&state, &metrics, &ticket, &query, outcome, started.elapsed());
        });

        self.replace_task(slot, handle);
        ticket
    }

    /// Load the detail view for `id`, superseding any lookup still in flight.
    ///
    /// The current results stay visible while the lookup runs.
    pub fn select_book(&self, id: &str) -> RequestTicket {
        let mut slot = self.detail_task.lock().unwrap_or_else(PoisonError::into_inner);

        let (ticket, _) = self.state_manager.begin_detail();
        self.metrics.record_started(LoadKind::Detail);
        tracing::debug!("Lookup #{} started: '{}'", ticket.generation, id);

        let client = Arc::clone(&self.client);
        let state = self.state_manager.clone();
        let metrics = Arc::clone(&self.metrics);
        let id = id.to_string();

        let handle = self.runtime.spawn(async move {
            let started = Instant::now();
            let outcome = client.get_book(&id).await;
            publish_detail(&state, &metrics, &ticket, &id, outcome, started.elapsed());
        });

        self.replace_task(&mut slot, handle);
        ticket
    }

    /// Abort any in-flight requests
    ///
    /// Aborted requests never publish. Called automatically on drop.
    pub fn shutdown(&self) {
        for slot in [&self.search_task, &self.detail_task] {
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = slot.take() {
                if !handle.is_finished() {
                    handle.abort();
                    self.metrics.record_cancelled();
                }
            }
        }
        tracing::debug!("Query controller shut down");
    }

    pub fn current_query(&self) -> String {
        self.current_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy of the latest published snapshot
    pub fn snapshot(&self) -> UiSnapshot {
        self.state_manager.snapshot()
    }

    /// Latest-value subscription to snapshots
    pub fn subscribe(&self) -> watch::Receiver<UiSnapshot> {
        self.state_manager.watch()
    }

    /// Event subscription to individual transitions
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StateChange> {
        self.state_manager.subscribe()
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.state_manager
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    fn replace_task(&self, slot: &mut Option<JoinHandle<()>>, handle: JoinHandle<()>) {
        if let Some(previous) = slot.replace(handle) {
            if !previous.is_finished() {
                previous.abort();
                self.metrics.record_cancelled();
                tracing::debug!("Aborted superseded request");
            }
        }
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn publish_search(
    state: &StateManager,
    metrics: &Metrics,
    ticket: &RequestTicket,
    query: &str,
    outcome: Result<BookCollection, CatalogError>,
    elapsed: Duration,
) {
    match outcome {
        Ok(collection) => {
            let count = collection.len();
            if state.finish_search(ticket, collection).is_some() {
                metrics.record_completed(elapsed);
                tracing::info!("Search '{}' returned {} books in {:?}", query, count, elapsed);
            } else {
                metrics.record_superseded();
                tracing::debug!("Discarding superseded search #{} ('{}')", ticket.generation, query);
            }
        }
        Err(err) if err.is_cancelled() => settle_cancelled(state, metrics, ticket),
        Err(err) => {
            if state.fail_search(ticket, err.user_message()).is_some() {
                metrics.record_failed(elapsed);
                tracing::warn!("Search '{}' failed: {}", query, err);
            } else {
                metrics.record_superseded();
                tracing::debug!(
                    "Discarding failure of superseded search #{}: {}",
                    ticket.generation,
                    err
                );
            }
        }
    }
}

fn publish_detail(
    state: &StateManager,
    metrics: &Metrics,
    ticket: &RequestTicket,
    id: &str,
    outcome: Result<Book, CatalogError>,
    elapsed: Duration,
) {
    match outcome {
        Ok(book) => {
            if state.finish_detail(ticket, book).is_some() {
                metrics.record_completed(elapsed);
                tracing::info!("Loaded book '{}' in {:?}", id, elapsed);
            } else {
                metrics.record_superseded();
                tracing::debug!("Discarding superseded lookup #{} ('{}')", ticket.generation, id);
            }
        }
        Err(err) if err.is_cancelled() => settle_cancelled(state, metrics, ticket),
        Err(err) => {
            if state.fail_detail(ticket, err.user_message()).is_some() {
                metrics.record_failed(elapsed);
                tracing::warn!("Lookup '{}' failed: {}", id, err);
            } else {
                metrics.record_superseded();
                tracing::debug!(
                    "Discarding failure of superseded lookup #{}: {}",
                    ticket.generation,
                    err
                );
            }
        }
    }
}

/// A client-side cancellation never produces an error. If nothing newer replaced the
/// request, only its loading flag is settled.
fn settle_cancelled(state: &StateManager, metrics: &Metrics, ticket: &RequestTicket) {
    metrics.record_cancelled();
    state.complete_request(ticket, |_| {});
    tracing::debug!("{} request #{} cancelled", ticket.kind.as_str(), ticket.generation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::timeout;

    /// Answers every search with one book named after the query
    struct EchoCatalog;

    #[async_trait]
    impl CatalogClient for EchoCatalog {
        async fn search_books(&self, query: &str) -> Result<BookCollection, CatalogError> {
            Ok(BookCollection::new(vec![Book::with_id(query)]))
        }

        async fn get_book(&self, id: &str) -> Result<Book, CatalogError> {
            if id == "cancel" {
                return Err(CatalogError::Cancelled);
            }
            Ok(Book::with_id(id))
        }
    }

    fn controller() -> QueryController {
        QueryController::new(
            Arc::new(EchoCatalog),
            StateManager::new("seed"),
            tokio::runtime::Handle::current(),
        )
    }

    async fn settled(controller: &QueryController) -> UiSnapshot {
        let mut rx = controller.subscribe();
        timeout(Duration::from_secs(1), rx.wait_for(|s| !s.is_loading))
            .await
            .expect("Timeout waiting for snapshot")
            .expect("Snapshot channel closed")
            .clone()
    }

    #[tokio::test]
    async fn test_seed_query() {
        let controller = controller();
        assert_eq!(controller.current_query(), "seed");
        assert!(!controller.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_search_publishes_loading_synchronously() {
        let controller = controller();

        controller.search("jazz");

        let snapshot = controller.snapshot();
        assert!(snapshot.is_loading);
        assert!(snapshot.last_result.is_none());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_set_query_updates_current_query() {
        let controller = controller();

        controller.set_query("blues");
        assert_eq!(controller.current_query(), "blues");

        let snapshot = settled(&controller).await;
        assert_eq!(snapshot.query, "blues");
        assert_eq!(snapshot.last_result.unwrap().items[0].id.as_deref(), Some("blues"));
    }

    #[tokio::test]
    async fn test_search_current_uses_seed() {
        let controller = controller();

        controller.search_current();

        let snapshot = settled(&controller).await;
        assert_eq!(snapshot.last_result.unwrap().items[0].id.as_deref(), Some("seed"));
    }

    #[tokio::test]
    async fn test_client_cancellation_is_silent() {
        let controller = controller();

        controller.select_book("cancel");

        let snapshot = settled(&controller).await;
        assert!(snapshot.error.is_none());
        assert!(snapshot.selected_book.is_none());
        assert_eq!(
            controller.metrics().requests_cancelled.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_shutdown_aborts_in_flight() {
        let controller = controller().with_debounce(Duration::from_secs(60));

        controller.search("never");
        controller.shutdown();
        tokio::task::yield_now().await;

        let snapshot = controller.snapshot();
        assert!(snapshot.last_result.is_none());
        assert!(snapshot.error.is_none());
    }
}
