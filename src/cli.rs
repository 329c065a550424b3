//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use imagefetch_core::{DEFAULT_MAX_RETRIES, DownloadConfig};

/// Batch download images referenced by CSV observation exports.
///
/// Imagefetch reads the image-link column of a CSV export and saves each
/// image as `image_<n>.<ext>` in the output directory, numbering one past
/// any images already there.
#[derive(Parser, Debug)]
#[command(name = "imagefetch")]
#[command(author, version, about)]
pub struct Args {
    /// CSV file with an 'image_url' (or 'url') column
    pub csv: PathBuf,

    /// Directory to save images into (must already exist)
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds (1-600)
    #[arg(short = 't', long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout_secs: u64,

    /// Maximum fetch attempts per image, including the first (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Base retry delay in milliseconds; doubles each retry (1-60000)
    #[arg(short = 'd', long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..=60000))]
    pub base_delay_ms: u64,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds the session configuration from the parsed flags.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig::new(
            Duration::from_secs(self.timeout_secs),
            u32::from(self.max_retries),
            Duration::from_millis(self.base_delay_ms),
        )
    }
}
