//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events on mutations
//! - Supports multiple subscribers
//! - Publishes the latest snapshot on the watch channel
//! - Resolves concurrent requests in favour of the latest ticket

use bookfinder::{Book, BookCollection, LoadKind, StateChange, StateManager};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<StateChange>) -> StateChange {
    timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

#[tokio::test]
async fn test_state_change_events_emitted() {
    let state = Arc::new(StateManager::new("jazz history"));
    let mut rx = state.subscribe();

    state.set_query("jazz");

    let event = next_event(&mut rx).await;
    assert_eq!(
        event,
        StateChange::QueryChanged {
            query: "jazz".to_string()
        }
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new("a"));
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();
    let mut rx3 = state.subscribe();

    state.update(|s| s.set_in_flight(LoadKind::Search, true));

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let event = next_event(rx).await;
        assert_eq!(event, StateChange::LoadingChanged { is_loading: true });
    }
}

#[tokio::test]
async fn test_search_workflow_events() {
    let state = Arc::new(StateManager::new("a"));
    let mut rx = state.subscribe();

    let (ticket, _) = state.begin_search("poetry");
    state
        .finish_search(
            &ticket,
            BookCollection::new(vec![Book::with_id("p1"), Book::with_id("p2")]),
        )
        .expect("current ticket");

    let mut events = Vec::new();
    while let Ok(Ok(event)) = timeout(Duration::from_millis(50), rx.recv()).await {
        events.push(event);
    }

    assert!(events.contains(&StateChange::QueryChanged {
        query: "poetry".to_string()
    }));
    assert!(events.contains(&StateChange::LoadingChanged { is_loading: true }));
    assert!(events.contains(&StateChange::ResultsChanged { count: Some(2) }));
    assert!(
        events.contains(&StateChange::LoadingChanged { is_loading: false }),
        "Loading should settle, got: {:?}",
        events
    );
}

#[tokio::test]
async fn test_error_events() {
    let state = Arc::new(StateManager::new("a"));
    let mut rx = state.subscribe();

    let (ticket, _) = state.begin_detail();
    state.fail_detail(&ticket, "Book x not found".to_string());

    let mut raised = None;
    while let Ok(Ok(event)) = timeout(Duration::from_millis(50), rx.recv()).await {
        if let StateChange::ErrorRaised { kind, message } = event {
            raised = Some((kind, message));
        }
    }
    assert_eq!(
        raised,
        Some((LoadKind::Detail, "Book x not found".to_string()))
    );

    // The next request clears the error
    state.begin_search("b");
    let mut cleared = false;
    while let Ok(Ok(event)) = timeout(Duration::from_millis(50), rx.recv()).await {
        cleared |= event == StateChange::ErrorCleared;
    }
    assert!(cleared, "Starting a search should clear the error");
}

#[tokio::test]
async fn test_stale_completion_emits_nothing() {
    let state = Arc::new(StateManager::new("a"));

    let (stale, _) = state.begin_search("a");
    let (_current, _) = state.begin_search("b");

    let mut rx = state.subscribe();
    let outcome = state.finish_search(&stale, BookCollection::new(vec![Book::with_id("a")]));

    assert!(outcome.is_none());
    assert!(
        timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
        "Stale completion must not emit events"
    );
}

#[tokio::test]
async fn test_watch_receives_latest_snapshot() {
    let state = Arc::new(StateManager::new("a"));
    let mut rx = state.watch();

    let (ticket, _) = state.begin_search("b");
    state.finish_search(&ticket, BookCollection::new(vec![Book::with_id("b")]));

    let snapshot = timeout(Duration::from_millis(100), rx.wait_for(|s| !s.is_loading))
        .await
        .expect("Timeout waiting for snapshot")
        .expect("Channel closed")
        .clone();

    assert_eq!(snapshot.query, "b");
    assert_eq!(snapshot.result_count(), 1);
}

#[tokio::test]
async fn test_concurrent_requests_latest_ticket_wins() {
    let state = Arc::new(StateManager::new("a"));

    // Tickets are issued in order; completions race
    let tickets: Vec<_> = (0..10)
        .map(|i| state.begin_search(&format!("q{}", i)).0)
        .collect();

    let mut handles = vec![];
    for (i, ticket) in tickets.into_iter().enumerate() {
        let state_clone = state.clone();
        let handle = tokio::spawn(async move {
            let id = format!("q{}", i);
            state_clone.finish_search(&ticket, BookCollection::new(vec![Book::with_id(id)]))
        });
        handles.push(handle);
    }

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            applied += 1;
        }
    }

    assert_eq!(applied, 1, "Only the latest ticket may publish");

    let snapshot = state.snapshot();
    assert_eq!(snapshot.query, "q9");
    assert!(!snapshot.is_loading);
    assert_eq!(
        snapshot.last_result.unwrap().items[0].id.as_deref(),
        Some("q9")
    );
}

#[tokio::test]
async fn test_concurrent_state_access() {
    let state = Arc::new(StateManager::new("a"));

    let mut handles = vec![];
    for i in 0..10 {
        let state_clone = state.clone();
        let handle = tokio::spawn(async move {
            state_clone.set_query(&format!("query {}", i));
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Last write wins, but the value is always one that was written
    let final_query = state.read(|s| s.query.clone());
    assert!(final_query.starts_with("query "));
}

#[tokio::test]
async fn test_independent_dimensions() {
    let state = Arc::new(StateManager::new("a"));

    let (search, _) = state.begin_search("a");
    let (detail, _) = state.begin_detail();

    state.finish_search(&search, BookCollection::new(vec![Book::with_id("1")]));
    let snapshot = state.snapshot();
    assert!(snapshot.is_loading, "detail still in flight");
    assert!(snapshot.detail_state().is_loading());
    assert!(!snapshot.list_state().is_loading());

    state.finish_detail(&detail, Book::with_id("1"));
    let snapshot = state.snapshot();
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.selected_book, Some(Book::with_id("1")));
}
