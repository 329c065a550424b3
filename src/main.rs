//! CLI entry point for the imagefetch tool.

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use imagefetch_core::{
    DownloadPipeline, MIN_FREE_BYTES, ProgressReporter, ProgressSnapshot, SessionSummary,
    check_target_dir, read_url_column,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Imagefetch starting");

    // Read the URL column; blanks stay in the list and are skipped per task.
    let list = read_url_column(&args.csv)
        .with_context(|| format!("failed to read {}", args.csv.display()))?;

    info!(
        rows = list.len(),
        column = %list.column,
        "Read CSV input"
    );

    if list.blank_count() == list.len() {
        bail!("no usable URLs in {}", args.csv.display());
    }
    if list.blank_count() > 0 {
        warn!(
            blank = list.blank_count(),
            "Blank rows will be skipped without a download attempt"
        );
    }

    // One-shot precondition check before the pipeline owns the directory.
    check_target_dir(&args.output_dir, MIN_FREE_BYTES)?;

    let pipeline = DownloadPipeline::new(args.download_config());
    let (reporter, snapshot_rx) = ProgressReporter::channel(list.len());
    let cancel = CancellationToken::new();

    // Ctrl-C requests a cooperative cancel; the in-flight download finishes
    // or times out before the pipeline honors it.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Cancellation requested, finishing current download");
                cancel.cancel();
            }
        });
    }

    let show_bar = !args.no_progress && !args.quiet && !args.json;
    let bar_handle = spawn_progress_bar(show_bar, snapshot_rx);

    let summary = pipeline
        .run(&list.urls, &args.output_dir, &cancel, &reporter)
        .await
        .context("download session aborted")?;

    // Closing the snapshot channel ends the render task.
    drop(reporter);
    if let Some(handle) = bar_handle {
        let _ = handle.await;
    }

    report_summary(&args, &summary)?;

    Ok(())
}

/// Prints the completion report: JSON on stdout when requested, otherwise
/// structured log lines with every failure enumerated for review.
fn report_summary(args: &Args, summary: &SessionSummary) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    for failure in summary.failures() {
        warn!(url = %failure.url, reason = %failure.reason, "Download failed");
    }

    if summary.cancelled() {
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "Download cancelled"
        );
    } else {
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "Download complete"
        );
    }

    Ok(())
}

/// Spawns the progress bar task when requested.
///
/// The task re-renders on every snapshot and exits when the pipeline drops
/// its reporter, closing the channel.
fn spawn_progress_bar(
    enabled: bool,
    mut rx: watch::Receiver<ProgressSnapshot>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !enabled {
        return None;
    }

    Some(tokio::spawn(async move {
        let total = rx.borrow().total as u64;
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow().clone();
            bar.set_position(snapshot.completed as u64);
            bar.set_message(format_progress_message(&snapshot));
        }

        bar.finish_and_clear();
    }))
}

/// Formats the speed/ETA trailer shown next to the bar.
fn format_progress_message(snapshot: &ProgressSnapshot) -> String {
    let mbits = snapshot.bytes_per_second * 8.0 / 1_000_000.0;
    match snapshot.eta_seconds {
        Some(eta) if eta >= 60.0 => format!("{mbits:.2} Mbit/s, {:.1}m left", eta / 60.0),
        Some(eta) => format!("{mbits:.2} Mbit/s, {eta:.0}s left"),
        None => format!("{mbits:.2} Mbit/s"),
    }
}
