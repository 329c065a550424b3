//! Error types for the download module.
//!
//! This module defines structured errors for fetch attempts and for the
//! pipeline run itself, providing context-rich messages for debugging and
//! user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a single fetch attempt.
///
/// All variants are terminal for the task they occurred in; the pipeline
/// records them and moves on. Only [`FetchError::Network`] and
/// [`FetchError::Timeout`] are retried inside the fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Definitive HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body below the minimum plausible image size.
    #[error("content too small fetching {url}: {length} bytes")]
    ContentTooSmall {
        /// The URL whose body was undersized.
        url: String,
        /// Actual body length in bytes.
        length: usize,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a content-too-small error.
    pub fn content_too_small(url: impl Into<String>, length: usize) -> Self {
        Self::ContentTooSmall {
            url: url.into(),
            length,
        }
    }

    /// Whether this failure may succeed on retry.
    ///
    /// Transport failures and timeouts are transient; a definitive HTTP
    /// response or an undersized body will not change on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

/// Run-level errors from the pipeline.
///
/// Per-task fetch failures never surface here; they are accumulated into the
/// session summary. A filesystem write failure signals the destination is
/// broken for every subsequent task, so it aborts the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The target directory does not exist or is not a directory.
    #[error("target directory does not exist: {path}")]
    InvalidTargetDir {
        /// The missing or non-directory path.
        path: PathBuf,
    },

    /// File system error writing a downloaded image.
    #[error("IO error writing to {path}: {source}")]
    Write {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Creates an invalid-target-directory error.
    pub fn invalid_target_dir(path: impl Into<PathBuf>) -> Self {
        Self::InvalidTargetDir { path: path.into() }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or
// `From<std::io::Error>` because our error variants require context (url,
// path) that the source errors don't provide. The helper constructor methods
// are the correct pattern here as they allow callers to provide context.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_timeout_display() {
        let error = FetchError::timeout("https://example.com/img.jpg");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/img.jpg"));
    }

    #[test]
    fn test_fetch_error_http_status_display() {
        let error = FetchError::http_status("https://example.com/img.jpg", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/img.jpg"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_fetch_error_content_too_small_display() {
        let error = FetchError::content_too_small("https://example.com/img.jpg", 50);
        let msg = error.to_string();
        assert!(msg.contains("too small"), "Expected 'too small' in: {msg}");
        assert!(msg.contains("50"), "Expected byte count in: {msg}");
    }

    #[test]
    fn test_fetch_error_transient_classification() {
        assert!(FetchError::timeout("http://example.com").is_transient());
        assert!(!FetchError::http_status("http://example.com", 500).is_transient());
        assert!(!FetchError::http_status("http://example.com", 404).is_transient());
        assert!(!FetchError::content_too_small("http://example.com", 10).is_transient());
    }

    #[test]
    fn test_pipeline_error_write_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = PipelineError::write(PathBuf::from("/tmp/image_1.jpg"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/image_1.jpg"), "Expected path in: {msg}");
    }

    #[test]
    fn test_pipeline_error_invalid_target_dir_display() {
        let error = PipelineError::invalid_target_dir("/no/such/dir");
        let msg = error.to_string();
        assert!(msg.contains("/no/such/dir"), "Expected path in: {msg}");
        assert!(
            msg.contains("does not exist"),
            "Expected 'does not exist' in: {msg}"
        );
    }
}
