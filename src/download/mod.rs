//! Sequential download pipeline for image batches.
//!
//! This module turns an ordered list of URLs into `image_<n>.<ext>` files in
//! a target directory, one URL at a time, in input order.
//!
//! # Features
//!
//! - Bounded-time GET with retry and exponential backoff for transport
//!   failures (definitive HTTP error responses are never retried)
//! - Sequence numbers that resume one past the highest existing
//!   `image_<n>.<ext>` in the target directory
//! - Content-type based extension resolution with a `jpg` fallback
//! - Cooperative cancellation checked at task boundaries
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use imagefetch_core::download::{DownloadConfig, DownloadPipeline};
//! use imagefetch_core::progress::ProgressReporter;
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let urls = vec!["https://example.com/a.jpg".to_string()];
//! let pipeline = DownloadPipeline::new(DownloadConfig::default());
//! let (reporter, _rx) = ProgressReporter::channel(urls.len());
//! let summary = pipeline
//!     .run(&urls, Path::new("./images"), &CancellationToken::new(), &reporter)
//!     .await?;
//! println!("Downloaded {} images", summary.succeeded());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod fetcher;
mod filename;
mod pipeline;

pub use config::{DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, DownloadConfig};
pub use error::{FetchError, PipelineError};
pub use fetcher::{FetchedImage, HttpFetcher, MIN_CONTENT_BYTES};
pub use filename::{extension_for, starting_number};
pub use pipeline::{DownloadPipeline, SessionSummary, TaskFailure};
