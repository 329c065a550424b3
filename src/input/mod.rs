//! CSV input handling: column detection and ordered URL extraction.
//!
//! The pipeline consumes an already-produced ordered sequence of raw URL
//! strings; this module produces that sequence from a CSV export. Column
//! matching is case-insensitive over `image_url` and `url`. Blank cells are
//! preserved in order, skipping them is the pipeline's decision.

mod csv_source;
mod error;

pub use csv_source::{UrlList, read_url_column};
pub use error::InputError;
