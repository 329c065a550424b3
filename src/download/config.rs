//! Download session configuration.
//!
//! All tunables for a run live in [`DownloadConfig`], an immutable value
//! passed into the pipeline at construction. There is no module-wide
//! configuration state.

use std::time::Duration;

/// Default per-request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum fetch attempts per task, including the first.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (2 seconds).
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Configuration for one download session.
///
/// # Default Values
///
/// - `timeout`: 30 seconds
/// - `max_retries`: 3 attempts total
/// - `base_delay`: 2 seconds
///
/// # Retry Delays
///
/// Delays double from `base_delay` each attempt: `base_delay`,
/// `2 * base_delay`, `4 * base_delay`, ... Only transport-level failures and
/// timeouts are retried; an HTTP error response is definitive.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,

    /// Maximum number of fetch attempts per task (including the initial
    /// attempt). Values below 1 are treated as 1.
    pub max_retries: u32,

    /// Delay before the first retry; doubles each subsequent retry.
    pub base_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl DownloadConfig {
    /// Creates a configuration with explicit values.
    #[must_use]
    pub fn new(timeout: Duration, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            timeout,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// Returns the effective attempt cap (never below 1).
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}
