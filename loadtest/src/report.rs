//! Request events and run statistics
//!
//! Virtual users report each request through a [`Reporter`]. Events go to
//! the `metrics` recorder and, when a collector is attached, over a bounded
//! channel into a [`RunSummary`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};

use crate::error::Outcome;
use crate::user::Task;

/// Capacity of the event channel between users and the collector
pub const EVENT_CHANNEL_CAPACITY: usize = 50_000;

/// Classified result of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestResult {
    Success,
    /// Non-2xx status
    Failure(u16),
    /// Transport error kind
    Error(&'static str),
}

impl From<&Outcome> for RequestResult {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success { .. } => RequestResult::Success,
            Outcome::Failure { status } => RequestResult::Failure(*status),
            Outcome::Error(e) => RequestResult::Error(e.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestEvent {
    pub task: Task,
    pub latency: Duration,
    pub result: RequestResult,
}

/// Cloneable handle used by virtual users to report requests
///
/// Clones share one dropped-event counter, so a runner can tell how many
/// events never reached its collector.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<mpsc::Sender<RequestEvent>>,
    dropped: Arc<AtomicU64>,
}

impl Reporter {
    pub fn new(tx: mpsc::Sender<RequestEvent>) -> Self {
        Self {
            tx: Some(tx),
            dropped: Arc::default(),
        }
    }

    /// Reporter that only records metrics
    pub fn metrics_only() -> Self {
        Self::default()
    }

    pub fn record(&self, task: Task, latency: Duration, outcome: &Outcome) {
        let result = RequestResult::from(outcome);

        counter!("moviesearch_requests_total", "task" => task.name()).increment(1);
        histogram!("moviesearch_request_duration_seconds", "task" => task.name()).record(latency);
        if result != RequestResult::Success {
            counter!("moviesearch_request_failures_total", "task" => task.name()).increment(1);
        }

        let Some(ref tx) = self.tx else {
            return;
        };
        // Never block a user on a slow collector
        if let Err(e) = tx.try_send(RequestEvent {
            task,
            latency,
            result,
        }) {
            counter!("moviesearch_events_dropped_total").increment(1);
            if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                let reason = match e {
                    TrySendError::Full(_) => "channel full",
                    TrySendError::Closed(_) => "collector gone",
                };
                warn!("Dropping request events ({}), run summary will under-count", reason);
            }
        }
    }

    /// Handle sharing the dropped-event count but holding no sender
    pub fn detached(&self) -> Self {
        Self {
            tx: None,
            dropped: self.dropped.clone(),
        }
    }

    /// Events that could not be delivered to the collector
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Latency samples for one task
#[derive(Debug, Default, Clone)]
pub struct LatencyStats {
    samples: Vec<Duration>,
}

/// Latency distribution of one task, computed from a single sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub mean: Duration,
    pub max: Duration,
}

impl LatencyStats {
    pub fn record(&mut self, latency: Duration) {
        self.samples.push(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nearest-rank percentiles; None without samples
    pub fn summarize(&self) -> Option<LatencySummary> {
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let max = *sorted.last()?;
        let total: Duration = sorted.iter().sum();

        Some(LatencySummary {
            p50: nearest_rank(&sorted, 50.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
            mean: u32::try_from(sorted.len())
                .map_or_else(|_| total.div_f64(sorted.len() as f64), |n| total / n),
            max,
        })
    }
}

fn nearest_rank(sorted: &[Duration], p: f64) -> Duration {
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Counters for one task
#[derive(Debug, Default, Clone)]
pub struct TaskStats {
    pub requests: u64,
    /// Non-2xx responses
    pub failures: u64,
    /// Transport errors
    pub errors: u64,
    pub latencies: LatencyStats,
}

impl TaskStats {
    fn record(&mut self, event: &RequestEvent) {
        self.requests += 1;
        match event.result {
            RequestResult::Success => self.latencies.record(event.latency),
            RequestResult::Failure(_) => self.failures += 1,
            RequestResult::Error(_) => self.errors += 1,
        }
    }
}

/// Aggregated results of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub tasks: BTreeMap<Task, TaskStats>,
    pub users: usize,
    pub duration: Duration,
    /// Events lost between users and the collector
    pub dropped_events: u64,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &RequestEvent) {
        self.tasks.entry(event.task).or_default().record(event);
    }

    pub fn requests(&self, task: Task) -> u64 {
        self.tasks.get(&task).map(|s| s.requests).unwrap_or(0)
    }

    pub fn total_requests(&self) -> u64 {
        self.tasks.values().map(|s| s.requests).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.tasks.values().map(|s| s.failures + s.errors).sum()
    }

    /// Fraction of requests that failed (0.0 to 1.0)
    pub fn error_rate(&self) -> f64 {
        let total = self.total_requests();
        if total > 0 {
            self.total_failures() as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> String {
        let tasks: BTreeMap<&str, serde_json::Value> = self
            .tasks
            .iter()
            .map(|(task, stats)| {
                let latency = stats.latencies.summarize();
                (
                    task.name(),
                    serde_json::json!({
                        "requests": stats.requests,
                        "failures": stats.failures,
                        "errors": stats.errors,
                        "p50_ms": latency.map(|l| millis(l.p50)),
                        "p95_ms": latency.map(|l| millis(l.p95)),
                        "p99_ms": latency.map(|l| millis(l.p99)),
                        "mean_ms": latency.map(|l| millis(l.mean)),
                        "max_ms": latency.map(|l| millis(l.max)),
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "users": self.users,
            "duration_secs": self.duration.as_secs_f64(),
            "total_requests": self.total_requests(),
            "total_failures": self.total_failures(),
            "error_rate": self.error_rate(),
            "dropped_events": self.dropped_events,
            "tasks": tasks,
        })
        .to_string()
    }

    pub fn log_summary(&self) {
        info!(
            "Run finished: {} users, {} requests, {} failures ({:.2}%) in {:?}",
            self.users,
            self.total_requests(),
            self.total_failures(),
            self.error_rate() * 100.0,
            self.duration
        );
        if self.dropped_events > 0 {
            warn!(
                "{} request events were dropped before reaching the summary",
                self.dropped_events
            );
        }
        for (task, stats) in &self.tasks {
            match stats.latencies.summarize() {
                Some(l) => info!(
                    "  {:<26} requests={:<6} failures={:<4} errors={:<4} p50={:?} p95={:?} p99={:?}",
                    task.name(),
                    stats.requests,
                    stats.failures,
                    stats.errors,
                    l.p50,
                    l.p95,
                    l.p99
                ),
                None => info!(
                    "  {:<26} requests={:<6} failures={:<4} errors={:<4} (no successful requests)",
                    task.name(),
                    stats.requests,
                    stats.failures,
                    stats.errors
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use serde_json::json;

    fn event(task: Task, ms: u64, result: RequestResult) -> RequestEvent {
        RequestEvent {
            task,
            latency: Duration::from_millis(ms),
            result,
        }
    }

    #[test]
    fn test_result_from_outcome() {
        assert_eq!(
            RequestResult::from(&Outcome::ok(json!({}))),
            RequestResult::Success
        );
        assert_eq!(
            RequestResult::from(&Outcome::status(404)),
            RequestResult::Failure(404)
        );
        assert_eq!(
            RequestResult::from(&Outcome::Error(TransportError::Timeout(Duration::from_secs(10)))),
            RequestResult::Error("timeout")
        );
    }

    #[test]
    fn test_latency_summary() {
        let mut stats = LatencyStats::default();
        assert_eq!(stats.summarize(), None);
        for ms in (1..=100).rev() {
            stats.record(Duration::from_millis(ms));
        }

        let summary = stats.summarize().unwrap();
        assert_eq!(summary.p50, Duration::from_millis(50));
        assert_eq!(summary.p95, Duration::from_millis(95));
        assert_eq!(summary.p99, Duration::from_millis(99));
        assert_eq!(summary.max, Duration::from_millis(100));
        assert_eq!(summary.mean, Duration::from_micros(50_500));
    }

    #[test]
    fn test_single_sample_summary() {
        let mut stats = LatencyStats::default();
        stats.record(Duration::from_millis(7));

        let summary = stats.summarize().unwrap();
        assert_eq!(summary.p50, Duration::from_millis(7));
        assert_eq!(summary.p99, Duration::from_millis(7));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::new();
        summary.record(&event(Task::SearchMovies, 10, RequestResult::Success));
        summary.record(&event(Task::SearchMovies, 20, RequestResult::Failure(500)));
        summary.record(&event(Task::GetGenres, 5, RequestResult::Error("timeout")));
        summary.record(&event(Task::GetGenres, 5, RequestResult::Success));

        assert_eq!(summary.requests(Task::SearchMovies), 2);
        assert_eq!(summary.requests(Task::CreateMovie), 0);
        assert_eq!(summary.total_requests(), 4);
        assert_eq!(summary.total_failures(), 2);
        assert!((summary.error_rate() - 0.5).abs() < f64::EPSILON);

        let json: serde_json::Value = serde_json::from_str(&summary.to_json()).unwrap();
        assert_eq!(json["total_requests"], 4);
        assert_eq!(json["tasks"]["search_movies"]["failures"], 1);
        assert_eq!(json["tasks"]["get_genres"]["errors"], 1);
    }

    #[tokio::test]
    async fn test_reporter_forwards_events() {
        let (tx, mut rx) = mpsc::channel(4);
        let reporter = Reporter::new(tx);
        reporter.record(Task::CreateMovie, Duration::from_millis(3), &Outcome::status(503));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.task, Task::CreateMovie);
        assert_eq!(received.result, RequestResult::Failure(503));
    }

    #[test]
    fn test_reporter_counts_events_dropped_on_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let reporter = Reporter::new(tx);
        let clone = reporter.clone();

        reporter.record(Task::GetGenres, Duration::from_millis(1), &Outcome::ok(json!({})));
        assert_eq!(reporter.dropped_events(), 0);
        clone.record(Task::GetGenres, Duration::from_millis(1), &Outcome::ok(json!({})));
        reporter.record(Task::GetGenres, Duration::from_millis(1), &Outcome::ok(json!({})));

        assert_eq!(reporter.dropped_events(), 2);
        assert_eq!(clone.dropped_events(), 2);
    }

    #[test]
    fn test_reporter_counts_events_dropped_after_collector_exit() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let reporter = Reporter::new(tx);

        reporter.record(Task::SearchMovies, Duration::from_millis(1), &Outcome::status(500));
        assert_eq!(reporter.dropped_events(), 1);
    }

    #[tokio::test]
    async fn test_detached_reporter_keeps_count_without_holding_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let reporter = Reporter::new(tx);
        let tally = reporter.detached();

        reporter.record(Task::GetGenres, Duration::from_millis(1), &Outcome::ok(json!({})));
        reporter.record(Task::GetGenres, Duration::from_millis(1), &Outcome::ok(json!({})));
        drop(reporter);

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
        assert_eq!(tally.dropped_events(), 1);
    }

    #[test]
    fn test_metrics_only_reporter_never_drops() {
        let reporter = Reporter::metrics_only();
        reporter.record(Task::SearchMovies, Duration::from_millis(1), &Outcome::ok(json!({})));
        assert_eq!(reporter.dropped_events(), 0);
    }
}
