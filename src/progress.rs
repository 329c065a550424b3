//! Progress snapshots and the single-slot hand-off to a presentation layer.
//!
//! The pipeline pushes a [`ProgressSnapshot`] after every task through a
//! [`ProgressReporter`], which wraps a `tokio::sync::watch` channel: a
//! single-slot, latest-wins hand-off. Only the most recent state matters for
//! a progress display, so a slow reader simply drops stale intermediates;
//! the sender never blocks and never fails the pipeline.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;

/// Guard against division by a zero speed estimate.
const SPEED_EPSILON: f64 = 1e-6;

/// A point-in-time progress report. Immutable value, handed off by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Tasks processed so far (succeeded, failed, or skipped).
    pub completed: usize,
    /// Total tasks in the input sequence.
    pub total: usize,
    /// Rolling mean download speed since run start, in bytes per second.
    pub bytes_per_second: f64,
    /// Estimated seconds remaining, absent until at least one item has
    /// completed with data.
    pub eta_seconds: Option<f64>,
}

impl ProgressSnapshot {
    /// The snapshot observed before any task has been processed.
    #[must_use]
    pub fn initial(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            bytes_per_second: 0.0,
            eta_seconds: None,
        }
    }
}

/// Sending half of the snapshot hand-off.
///
/// `report` overwrites the slot with the latest snapshot; it never blocks
/// and ignores the absence of readers.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressReporter {
    /// Creates the hand-off pair. The receiver can be cloned and handed to
    /// any number of presentation tasks; each sees the latest value via
    /// `rx.changed().await` / `rx.borrow()`.
    #[must_use]
    pub fn channel(total: usize) -> (Self, watch::Receiver<ProgressSnapshot>) {
        let (tx, rx) = watch::channel(ProgressSnapshot::initial(total));
        (Self { tx }, rx)
    }

    /// Publishes the latest snapshot.
    pub fn report(&self, snapshot: ProgressSnapshot) {
        // send() only fails if all receivers are dropped; the pipeline
        // must not care whether anyone is watching.
        let _ = self.tx.send(snapshot);
    }
}

/// Accumulates the run clock and byte counter that snapshots are derived
/// from. Owned by the pipeline for the duration of one session.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    started: Instant,
    bytes_total: u64,
    items_with_bytes: usize,
}

impl ProgressTracker {
    /// Starts the run clock.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            started: Instant::now(),
            bytes_total: 0,
            items_with_bytes: 0,
        }
    }

    /// Records the bytes written for one successful task.
    pub fn record_bytes(&mut self, bytes: u64) {
        self.bytes_total = self.bytes_total.saturating_add(bytes);
        self.items_with_bytes += 1;
    }

    /// Builds the snapshot for the current state of the run.
    #[must_use]
    pub fn snapshot(&self, completed: usize) -> ProgressSnapshot {
        build_snapshot(
            completed,
            self.total,
            self.bytes_total,
            self.items_with_bytes,
            self.started.elapsed(),
        )
    }
}

/// Snapshot arithmetic, separated from the clock so it can be tested with
/// explicit elapsed times.
fn build_snapshot(
    completed: usize,
    total: usize,
    bytes_total: u64,
    items_with_bytes: usize,
    elapsed: Duration,
) -> ProgressSnapshot {
    let bytes_per_second = mean_speed(bytes_total, elapsed);
    let eta_seconds = estimate_eta(
        completed,
        total,
        bytes_total,
        items_with_bytes,
        bytes_per_second,
    );
    ProgressSnapshot {
        completed,
        total,
        bytes_per_second,
        eta_seconds,
    }
}

/// Mean bytes per second since run start.
#[allow(clippy::cast_precision_loss)]
fn mean_speed(bytes_total: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes_total as f64 / secs
}

/// Estimated seconds remaining:
/// `remaining_items * average_bytes_per_item / bytes_per_second`.
///
/// Returns `None` until at least one item has completed with data, since
/// both the per-item average and the speed estimate are meaningless before
/// that.
#[allow(clippy::cast_precision_loss)]
fn estimate_eta(
    completed: usize,
    total: usize,
    bytes_total: u64,
    items_with_bytes: usize,
    bytes_per_second: f64,
) -> Option<f64> {
    if completed < 1 || items_with_bytes < 1 {
        return None;
    }
    let avg_bytes_per_item = bytes_total as f64 / items_with_bytes as f64;
    let remaining = total.saturating_sub(completed) as f64;
    Some(remaining * avg_bytes_per_item / bytes_per_second.max(SPEED_EPSILON))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    // ==================== Snapshot Math Tests ====================

    #[test]
    fn test_mean_speed_bytes_over_elapsed() {
        assert_eq!(mean_speed(1000, Duration::from_secs(2)), 500.0);
    }

    #[test]
    fn test_mean_speed_zero_elapsed_is_zero() {
        assert_eq!(mean_speed(1000, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_eta_absent_before_first_completion() {
        assert_eq!(estimate_eta(0, 10, 0, 0, 0.0), None);
    }

    #[test]
    fn test_eta_absent_without_any_bytes() {
        // First task failed: completed but no data to average over.
        assert_eq!(estimate_eta(1, 10, 0, 0, 0.0), None);
    }

    #[test]
    fn test_eta_remaining_bytes_over_speed() {
        // 4 of 10 done, 4000 bytes over 4 items at 1000 B/s:
        // 6 remaining * 1000 avg / 1000 B/s = 6 seconds.
        let eta = estimate_eta(4, 10, 4000, 4, 1000.0).unwrap();
        assert!((eta - 6.0).abs() < 1e-9, "eta was {eta}");
    }

    #[test]
    fn test_eta_zero_when_all_completed() {
        let eta = estimate_eta(10, 10, 4000, 8, 1000.0).unwrap();
        assert_eq!(eta, 0.0);
    }

    #[test]
    fn test_build_snapshot_carries_counts() {
        let snapshot = build_snapshot(3, 7, 3000, 3, Duration::from_secs(3));
        assert_eq!(snapshot.completed, 3);
        assert_eq!(snapshot.total, 7);
        assert_eq!(snapshot.bytes_per_second, 1000.0);
        assert!(snapshot.eta_seconds.is_some());
    }

    // ==================== Tracker Tests ====================

    #[test]
    fn test_tracker_accumulates_bytes() {
        let mut tracker = ProgressTracker::new(5);
        tracker.record_bytes(100);
        tracker.record_bytes(300);
        assert_eq!(tracker.bytes_total, 400);
        assert_eq!(tracker.items_with_bytes, 2);
    }

    #[test]
    fn test_tracker_snapshot_reflects_completed() {
        let tracker = ProgressTracker::new(5);
        let snapshot = tracker.snapshot(2);
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.total, 5);
    }

    // ==================== Hand-off Tests ====================

    #[tokio::test]
    async fn test_reporter_latest_value_wins() {
        let (reporter, rx) = ProgressReporter::channel(3);
        assert_eq!(rx.borrow().completed, 0);

        reporter.report(ProgressSnapshot {
            completed: 1,
            total: 3,
            bytes_per_second: 10.0,
            eta_seconds: None,
        });
        reporter.report(ProgressSnapshot {
            completed: 2,
            total: 3,
            bytes_per_second: 20.0,
            eta_seconds: Some(1.0),
        });

        // A slow reader only ever observes the most recent snapshot.
        assert_eq!(rx.borrow().completed, 2);
        assert_eq!(rx.borrow().bytes_per_second, 20.0);
    }

    #[tokio::test]
    async fn test_reporter_survives_dropped_receiver() {
        let (reporter, rx) = ProgressReporter::channel(1);
        drop(rx);
        // Must not panic or block when nobody is watching.
        reporter.report(ProgressSnapshot::initial(1));
    }
}
