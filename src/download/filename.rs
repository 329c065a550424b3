//! Sequence-number allocation and content-type extension resolution.
//!
//! Output files are named `image_<n>.<ext>`. The starting number for a run
//! is one past the highest `image_<n>` already present in the target
//! directory, so a partially completed batch can be resumed without
//! overwriting prior files.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Pattern matched against existing directory entries when choosing the
/// starting sequence number. Any extension counts; unrelated files don't.
#[allow(clippy::expect_used)]
static SEQUENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^image_(\d+)\.\w+$").expect("sequence regex is valid") // Static pattern, safe to panic
});

/// Returns the first sequence number to assign in `dir`.
///
/// Scans the directory for filenames matching `image_<digits>.<extension>`
/// and returns one past the highest number found. Returns 1 when the
/// directory is empty, nonexistent, unreadable, or contains no matching
/// entries.
#[must_use]
pub fn starting_number(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 1;
    };

    let max = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            let captures = SEQUENCE_PATTERN.captures(name)?;
            captures.get(1)?.as_str().parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);

    debug!(dir = %dir.display(), max_existing = max, "scanned for existing sequence numbers");
    max + 1
}

/// Maps a declared Content-Type to an output file extension.
///
/// Case-insensitive on the MIME type; parameters (`; charset=...`) are
/// ignored. Unrecognized types fall back to `jpg` so no file is ever written
/// extension-less.
#[must_use]
pub fn extension_for(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/svg+xml" => "svg",
        _ => "jpg", // Fallback for unknown types
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== Starting Number Tests ====================

    #[test]
    fn test_starting_number_empty_directory_is_one() {
        let dir = TempDir::new().unwrap();
        assert_eq!(starting_number(dir.path()), 1);
    }

    #[test]
    fn test_starting_number_nonexistent_directory_is_one() {
        assert_eq!(starting_number(Path::new("/no/such/directory")), 1);
    }

    #[test]
    fn test_starting_number_resumes_past_highest_match() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("image_1.png"), b"x").unwrap();
        std::fs::write(dir.path().join("image_3.jpg"), b"x").unwrap();
        assert_eq!(starting_number(dir.path()), 4);
    }

    #[test]
    fn test_starting_number_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("image_2.webp"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("image_final.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("img_9.jpg"), b"x").unwrap();
        assert_eq!(starting_number(dir.path()), 3);
    }

    #[test]
    fn test_starting_number_requires_exact_shape() {
        let dir = TempDir::new().unwrap();
        // Prefixed, suffixed, or extension-less names must not match.
        std::fs::write(dir.path().join("old_image_7.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("image_7.jpg.bak"), b"x").unwrap();
        std::fs::write(dir.path().join("image_7"), b"x").unwrap();
        assert_eq!(starting_number(dir.path()), 1);
    }

    #[test]
    fn test_starting_number_mixed_extensions_all_count() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("image_10.gif"), b"x").unwrap();
        std::fs::write(dir.path().join("image_2.png"), b"x").unwrap();
        assert_eq!(starting_number(dir.path()), 11);
    }

    // ==================== Extension Mapping Tests ====================

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/jpg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/gif"), "gif");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("image/bmp"), "bmp");
        assert_eq!(extension_for("image/tiff"), "tiff");
        assert_eq!(extension_for("image/svg+xml"), "svg");
    }

    #[test]
    fn test_extension_for_unknown_type_falls_back_to_jpg() {
        assert_eq!(extension_for("text/html"), "jpg");
        assert_eq!(extension_for("application/octet-stream"), "jpg");
        assert_eq!(extension_for(""), "jpg");
    }

    #[test]
    fn test_extension_for_is_case_insensitive() {
        assert_eq!(extension_for("IMAGE/PNG"), "png");
        assert_eq!(extension_for("Image/Jpeg"), "jpg");
    }

    #[test]
    fn test_extension_for_strips_parameters() {
        assert_eq!(extension_for("image/jpeg; charset=utf-8"), "jpg");
        assert_eq!(extension_for("image/png ; boundary=x"), "png");
    }
}
