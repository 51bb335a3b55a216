// Request metrics module
//
// Lightweight counters describing how the controller's requests played out

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::models::LoadKind;

/// Request counters shared between the controller and its tasks
///
/// Uses atomic operations for thread-safe tracking without locks.
#[derive(Debug)]
pub struct Metrics {
    /// Searches started (one per edit unless debounced)
    pub searches_started: AtomicU64,

    /// Detail lookups started
    pub lookups_started: AtomicU64,

    /// Requests whose result was published
    pub requests_completed: AtomicU64,

    /// Requests whose failure was published
    pub requests_failed: AtomicU64,

    /// Results discarded because a newer request of the same kind had started
    pub requests_superseded: AtomicU64,

    /// In-flight tasks aborted before completing
    pub requests_cancelled: AtomicU64,

    /// Total time spent waiting on the catalog, in milliseconds
    pub total_request_time_ms: AtomicU64,

    /// Controller start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            searches_started: AtomicU64::new(0),
            lookups_started: AtomicU64::new(0),
            requests_completed: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            requests_superseded: AtomicU64::new(0),
            requests_cancelled: AtomicU64::new(0),
            total_request_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_started(&self, kind: LoadKind) {
        match kind {
            LoadKind::Search => self.searches_started.fetch_add(1, Ordering::Relaxed),
            LoadKind::Detail => self.lookups_started.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_completed(&self, elapsed: Duration) {
        self.requests_completed.fetch_add(1, Ordering::Relaxed);
        self.record_request_time(elapsed);
    }

    pub fn record_failed(&self, elapsed: Duration) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        self.record_request_time(elapsed);
    }

    pub fn record_superseded(&self) {
        self.requests_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.requests_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    fn record_request_time(&self, elapsed: Duration) {
        self.total_request_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average latency of settled requests in milliseconds
    pub fn avg_request_time_ms(&self) -> f64 {
        let total = self.total_request_time_ms.load(Ordering::Relaxed);
        let count = self.requests_completed.load(Ordering::Relaxed)
            + self.requests_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Request Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Started: {} searches, {} lookups",
            self.searches_started.load(Ordering::Relaxed),
            self.lookups_started.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Settled: {} completed, {} failed (avg {:.2}ms)",
            self.requests_completed.load(Ordering::Relaxed),
            self.requests_failed.load(Ordering::Relaxed),
            self.avg_request_time_ms()
        );
        tracing::info!(
            "Dropped: {} superseded, {} cancelled",
            self.requests_superseded.load(Ordering::Relaxed),
            self.requests_cancelled.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
