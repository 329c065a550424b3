//! CSV reading and URL column selection.

use std::path::Path;

use tracing::debug;

use super::error::InputError;

/// Column names recognized as the URL column, in priority order. Matching
/// is case-insensitive, which covers exports using `IMAGE_URL`, `Image_URL`,
/// `URL`, and similar.
const URL_COLUMN_CANDIDATES: [&str; 2] = ["image_url", "url"];

/// The ordered URL column of one CSV file.
#[derive(Debug, Clone)]
pub struct UrlList {
    /// Raw cell values in row order. May contain blank entries; the
    /// pipeline skips those without a network call.
    pub urls: Vec<String>,
    /// The header name the column was matched under.
    pub column: String,
}

impl UrlList {
    /// Returns the number of rows, blanks included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns true when the file had no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns the number of blank or whitespace-only entries.
    #[must_use]
    pub fn blank_count(&self) -> usize {
        self.urls.iter().filter(|u| u.trim().is_empty()).count()
    }
}

/// Reads the URL column from a CSV file, preserving row order and blanks.
///
/// The column is the first header matching `image_url` case-insensitively,
/// else the first matching `url`. Rows shorter than the header yield an
/// empty value rather than an error.
///
/// # Errors
///
/// Returns [`InputError::Csv`] when the file cannot be opened or parsed,
/// [`InputError::MissingUrlColumn`] when no header matches, and
/// [`InputError::Empty`] when the file has no data rows.
pub fn read_url_column(path: &Path) -> Result<UrlList, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| InputError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| InputError::csv(path, e))?
        .clone();
    let column_index = select_url_column(&headers)?;
    let column = headers
        .get(column_index)
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| InputError::csv(path, e))?;
        urls.push(record.get(column_index).unwrap_or("").to_string());
    }

    if urls.is_empty() {
        return Err(InputError::Empty {
            path: path.to_path_buf(),
        });
    }

    debug!(
        path = %path.display(),
        column,
        rows = urls.len(),
        "read URL column"
    );

    Ok(UrlList { urls, column })
}

/// Picks the URL column index from the header row.
fn select_url_column(headers: &csv::StringRecord) -> Result<usize, InputError> {
    for candidate in URL_COLUMN_CANDIDATES {
        if let Some(index) = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(candidate))
        {
            return Ok(index);
        }
    }
    Err(InputError::MissingUrlColumn {
        available: headers.iter().map(str::to_string).collect(),
    })
}
