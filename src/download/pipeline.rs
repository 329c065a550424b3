//! Sequential orchestration of one download session.
//!
//! The pipeline walks the input URL list in order, one task at a time:
//! validate, fetch, resolve an extension, write `image_<n>.<ext>`, report
//! progress, check for cancellation. A task's fetch failure never aborts the
//! batch; a filesystem write failure always does.
//!
//! A session moves `Idle -> Running -> {Completed, Cancelled,
//! AbortedOnFatalError}`. The first two terminal states are the `Ok` cases
//! of [`DownloadPipeline::run`] (distinguished by
//! [`SessionSummary::cancelled`]); the third is the `Err` case. There is no
//! way back to `Running`; a new `run` call starts a fresh session.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::config::DownloadConfig;
use super::error::PipelineError;
use super::fetcher::HttpFetcher;
use super::filename::{extension_for, starting_number};
use crate::progress::{ProgressReporter, ProgressTracker};

/// One task's failure, kept for user review rather than just counted.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    /// The URL that failed.
    pub url: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Aggregate result of one pipeline run.
///
/// Created zeroed at session start, mutated once per task outcome, and
/// finalized when the loop ends.
#[derive(Debug, Default, Serialize)]
pub struct SessionSummary {
    succeeded: usize,
    failed: usize,
    skipped: usize,
    cancelled: bool,
    failures: Vec<TaskFailure>,
}

impl SessionSummary {
    /// Creates a summary with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of images written to disk.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Returns the number of tasks whose fetch failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Returns the number of blank or malformed URLs skipped without a
    /// network call.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether the run ended early through cancellation.
    #[must_use]
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns the total number of tasks processed so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// Per-task failures (URL + reason), in task order.
    #[must_use]
    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    fn record_success(&mut self) {
        self.succeeded += 1;
    }

    fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    fn record_failure(&mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(TaskFailure {
            url: url.into(),
            reason: reason.into(),
        });
    }
}

/// Sequential download pipeline.
///
/// Downloads proceed strictly one at a time in input order, so sequence
/// numbers are assigned deterministically. The target directory is
/// exclusively written by the pipeline for the run's duration.
#[derive(Debug, Clone)]
pub struct DownloadPipeline {
    fetcher: HttpFetcher,
}

impl DownloadPipeline {
    /// Creates a pipeline for one or more sessions with the given
    /// configuration.
    #[must_use]
    pub fn new(config: DownloadConfig) -> Self {
        Self {
            fetcher: HttpFetcher::new(config),
        }
    }

    /// Runs one session over `urls`, writing into `target_dir`.
    ///
    /// Per task: cancellation is checked at the task boundary (an in-flight
    /// fetch is allowed to complete or time out first); blank or malformed
    /// URLs are skipped without a network call and do not consume a sequence
    /// number; fetch failures are recorded and the batch continues. A
    /// snapshot is pushed to `reporter` after every task.
    ///
    /// Files already written stay on disk whatever the terminal state; there
    /// is no rollback.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTargetDir`] when `target_dir` is not
    /// an existing directory, and [`PipelineError::Write`] when writing an
    /// image fails; write failures abort the run immediately.
    #[instrument(skip_all, fields(total = urls.len(), target_dir = %target_dir.display()))]
    pub async fn run(
        &self,
        urls: &[String],
        target_dir: &Path,
        cancel: &CancellationToken,
        reporter: &ProgressReporter,
    ) -> Result<SessionSummary, PipelineError> {
        if !target_dir.is_dir() {
            return Err(PipelineError::invalid_target_dir(target_dir));
        }

        let mut sequence = starting_number(target_dir);
        let mut tracker = ProgressTracker::new(urls.len());
        let mut summary = SessionSummary::new();

        info!(start_number = sequence, "starting download session");

        for raw in urls {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                info!(processed = summary.processed(), "session cancelled");
                break;
            }

            match well_formed_url(raw) {
                None => {
                    debug!(raw, "skipping blank or malformed URL");
                    summary.record_skipped();
                }
                Some(url) => match self.fetcher.fetch(url).await {
                    Err(e) => {
                        warn!(url, error = %e, "task failed");
                        summary.record_failure(url, e.to_string());
                    }
                    Ok(image) => {
                        let extension = extension_for(&image.content_type);
                        let path = target_dir.join(format!("image_{sequence}.{extension}"));
                        if let Err(e) = tokio::fs::write(&path, &image.bytes).await {
                            // The destination is broken for every later task
                            // too; drop the partial file and abort the run.
                            let _ = tokio::fs::remove_file(&path).await;
                            return Err(PipelineError::write(path, e));
                        }
                        debug!(path = %path.display(), bytes = image.bytes.len(), "wrote image");
                        tracker.record_bytes(image.bytes.len() as u64);
                        summary.record_success();
                        sequence += 1;
                    }
                },
            }

            reporter.report(tracker.snapshot(summary.processed()));
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "session finished"
        );

        Ok(summary)
    }
}

/// Returns the trimmed URL when it passes the basic well-formedness check:
/// non-blank, parsable, and an http(s) scheme.
fn well_formed_url(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(trimmed).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(trimmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== URL Validation Tests ====================

    #[test]
    fn test_well_formed_url_accepts_http_and_https() {
        assert_eq!(
            well_formed_url("https://example.com/a.jpg"),
            Some("https://example.com/a.jpg")
        );
        assert_eq!(
            well_formed_url("http://example.com/a.jpg"),
            Some("http://example.com/a.jpg")
        );
    }

    #[test]
    fn test_well_formed_url_trims_whitespace() {
        assert_eq!(
            well_formed_url("  https://example.com/a.jpg  "),
            Some("https://example.com/a.jpg")
        );
    }

    #[test]
    fn test_well_formed_url_rejects_blank() {
        assert_eq!(well_formed_url(""), None);
        assert_eq!(well_formed_url("   "), None);
        assert_eq!(well_formed_url("\t\n"), None);
    }

    #[test]
    fn test_well_formed_url_rejects_malformed() {
        assert_eq!(well_formed_url("not a url"), None);
        assert_eq!(well_formed_url("http://"), None);
    }

    #[test]
    fn test_well_formed_url_rejects_other_schemes() {
        assert_eq!(well_formed_url("mailto:someone@example.com"), None);
        assert_eq!(well_formed_url("ftp://example.com/a.jpg"), None);
        assert_eq!(well_formed_url("file:///tmp/a.jpg"), None);
    }

    // ==================== Summary Tests ====================

    #[test]
    fn test_summary_starts_zeroed() {
        let summary = SessionSummary::new();
        assert_eq!(summary.succeeded(), 0);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.skipped(), 0);
        assert!(!summary.cancelled());
        assert!(summary.failures().is_empty());
    }

    #[test]
    fn test_summary_counts_each_outcome() {
        let mut summary = SessionSummary::new();
        summary.record_success();
        summary.record_success();
        summary.record_skipped();
        summary.record_failure("http://example.com/a.jpg", "HTTP 404");

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.processed(), 4);
    }

    #[test]
    fn test_summary_failures_keep_url_and_reason() {
        let mut summary = SessionSummary::new();
        summary.record_failure("http://example.com/a.jpg", "HTTP 404");

        let failure = &summary.failures()[0];
        assert_eq!(failure.url, "http://example.com/a.jpg");
        assert_eq!(failure.reason, "HTTP 404");
    }

    #[test]
    fn test_summary_serializes_counts_and_failures() {
        let mut summary = SessionSummary::new();
        summary.record_success();
        summary.record_failure("http://example.com/a.jpg", "timeout");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["cancelled"], false);
        assert_eq!(json["failures"][0]["reason"], "timeout");
    }
}
