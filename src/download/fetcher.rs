//! HTTP fetcher for single bounded-time image downloads.
//!
//! This module provides the [`HttpFetcher`] which performs one GET per task
//! with a configured timeout, retrying transport-level failures with
//! exponential backoff. It performs network I/O only; writing bytes to disk
//! is the pipeline's job.
//!
//! # Retry behavior
//!
//! - Transport failures and timeouts are retried up to the configured
//!   attempt cap, with delays doubling from `base_delay`
//! - A definitive HTTP response with status 400-599 is never retried
//! - An undersized body (< [`MIN_CONTENT_BYTES`]) is never retried
//!
//! Between retries the task sleeps, which yields the worker so cancellation
//! can be observed by the caller; the fetcher itself does not check
//! cancellation.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

use super::config::DownloadConfig;
use super::error::FetchError;

/// Minimum plausible image body size in bytes.
///
/// Responses below this threshold are classified as invalid content, they
/// are usually HTML error pages served with a 200 status.
pub const MIN_CONTENT_BYTES: usize = 100;

/// Content type assumed when the server sends no Content-Type header.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Cap on a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A successfully fetched image body with its declared content type.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Raw response body. Non-empty and at least [`MIN_CONTENT_BYTES`] long.
    pub bytes: Vec<u8>,
    /// Declared Content-Type header value, or `application/octet-stream`
    /// when the header was absent.
    pub content_type: String,
}

/// HTTP fetcher for image downloads.
///
/// Designed to be created once per session and reused for every task,
/// taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: DownloadConfig,
}

impl HttpFetcher {
    /// Creates a fetcher with the given session configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(config: DownloadConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, config }
    }

    /// Fetches one URL, retrying transport failures with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns the last [`FetchError`] once retries are exhausted, or
    /// immediately for definitive failures (HTTP error status, undersized
    /// body).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting fetch");

            match self.fetch_once(url).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = backoff_delay(self.config.base_delay, attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "transient fetch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "fetch failed");
                    return Err(e);
                }
            }
        }
    }

    /// Performs a single GET attempt.
    async fn fetch_once(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status().as_u16();
        if (400..=599).contains(&status) {
            return Err(FetchError::http_status(url, status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        if bytes.len() < MIN_CONTENT_BYTES {
            return Err(FetchError::content_too_small(url, bytes.len()));
        }

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

/// Maps a reqwest error to the fetch error taxonomy.
fn classify_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::timeout(url)
    } else {
        FetchError::network(url, error)
    }
}

/// Calculates the backoff delay before the retry following `attempt`.
///
/// Delays double each attempt starting at `base`: `base`, `2 * base`,
/// `4 * base`, ... capped at [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << shift).min(MAX_BACKOFF)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== Backoff Delay Tests ====================

    #[test]
    fn test_backoff_delay_first_retry_uses_base() {
        let delay = backoff_delay(Duration::from_secs(2), 1);
        assert_eq!(delay, Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_delay_doubles_each_attempt() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(8));
        assert_eq!(backoff_delay(base, 4), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_delay_respects_cap() {
        let delay = backoff_delay(Duration::from_secs(2), 10);
        assert_eq!(delay, MAX_BACKOFF);
    }

    #[test]
    fn test_backoff_delay_large_attempt_does_not_overflow() {
        let delay = backoff_delay(Duration::from_secs(2), u32::MAX);
        assert_eq!(delay, MAX_BACKOFF);
    }

    // ==================== Fetcher Construction Tests ====================

    #[test]
    fn test_fetcher_new_stores_config() {
        let config = DownloadConfig::new(Duration::from_secs(5), 4, Duration::from_millis(10));
        let fetcher = HttpFetcher::new(config);
        assert_eq!(fetcher.config.max_attempts(), 4);
        assert_eq!(fetcher.config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_fetched_image_holds_declared_content_type() {
        let image = FetchedImage {
            bytes: vec![0u8; 200],
            content_type: "image/png".to_string(),
        };
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes.len(), 200);
    }
}
