//! Imagefetch Core Library
//!
//! This library provides the core functionality for the imagefetch tool,
//! which turns a CSV export of image links (e.g. from a biological
//! observation platform) into sequentially numbered image files on disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - Sequential download pipeline: fetcher, filename
//!   allocation, and per-run orchestration
//! - [`input`] - CSV column detection and ordered URL extraction
//! - [`preflight`] - Target directory and disk-space checks run once
//!   before a session
//! - [`progress`] - Snapshot values and the single-slot progress hand-off

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod input;
pub mod preflight;
pub mod progress;

// Re-export commonly used types
pub use download::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, DownloadConfig, DownloadPipeline,
    FetchError, FetchedImage, HttpFetcher, PipelineError, SessionSummary, TaskFailure,
    extension_for, starting_number,
};
pub use input::{InputError, UrlList, read_url_column};
pub use preflight::{MIN_FREE_BYTES, PreflightError, check_target_dir};
pub use progress::{ProgressReporter, ProgressSnapshot, ProgressTracker};
