//! Error types for CSV input handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting the URL column from a CSV file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be opened or parsed as CSV.
    #[error("failed reading {path}: {source}")]
    Csv {
        /// The CSV file path.
        path: PathBuf,
        /// The underlying reader error.
        #[source]
        source: csv::Error,
    },

    /// No recognized URL column in the header row.
    #[error("CSV must have an 'image_url' or 'url' column (found: {})", available.join(", "))]
    MissingUrlColumn {
        /// The column names that were present.
        available: Vec<String>,
    },

    /// The file has a header but no data rows.
    #[error("no data rows in {path}")]
    Empty {
        /// The CSV file path.
        path: PathBuf,
    },
}

impl InputError {
    /// Creates a reader error with its file path context.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
