//! Pre-run checks for the target directory.
//!
//! Invoked once before a session starts: the directory must exist, and the
//! filesystem should have room for a batch of images. When the free-space
//! statistic itself cannot be read the run proceeds anyway; only a positive
//! "not enough space" answer blocks it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Minimum free space required before a session starts (100 MB).
pub const MIN_FREE_BYTES: u64 = 100_000_000;

/// Errors from the pre-run target directory check.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// The download directory does not exist.
    #[error("download directory does not exist: {path}")]
    MissingDirectory {
        /// The missing path.
        path: PathBuf,
    },

    /// The download path exists but is not a directory.
    #[error("download path is not a directory: {path}")]
    NotADirectory {
        /// The non-directory path.
        path: PathBuf,
    },

    /// The filesystem reports less free space than required.
    #[error(
        "not enough disk space in {path}: {available} bytes available, {required} bytes required"
    )]
    InsufficientSpace {
        /// The checked path.
        path: PathBuf,
        /// Free bytes reported by the filesystem.
        available: u64,
        /// The configured floor.
        required: u64,
    },
}

/// Checks that `path` is an existing directory with at least
/// `required_bytes` of free space.
///
/// # Errors
///
/// Returns a [`PreflightError`] when the directory is missing, is not a
/// directory, or the filesystem reports insufficient space.
pub fn check_target_dir(path: &Path, required_bytes: u64) -> Result<(), PreflightError> {
    if !path.exists() {
        return Err(PreflightError::MissingDirectory {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(PreflightError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    match available_space(path) {
        Ok(available) if available < required_bytes => Err(PreflightError::InsufficientSpace {
            path: path.to_path_buf(),
            available,
            required: required_bytes,
        }),
        Ok(available) => {
            debug!(path = %path.display(), available, "disk space check passed");
            Ok(())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read free space, proceeding");
            Ok(())
        }
    }
}

/// Get available disk space for a given path.
///
/// Uses platform-specific APIs to query filesystem statistics:
/// - unix: statvfs
/// - Windows: GetDiskFreeSpaceExW
fn available_space(path: &Path) -> std::io::Result<u64> {
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid null-terminated C string, stat is
        // zero-initialized before the call, and it is only read after the
        // call reports success.
        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            // f_bavail is the block count available to unprivileged users;
            // f_frsize is the fragment size (preferred over f_bsize).
            #[allow(clippy::unnecessary_cast)]
            Ok((stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64))
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::fileapi::GetDiskFreeSpaceExW;

        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide_path is a valid null-terminated wide string, the out
        // pointers reference valid u64s, and they are only read after the
        // call reports success.
        unsafe {
            let mut free_bytes_available: u64 = 0;
            let mut _total_bytes: u64 = 0;
            let mut _total_free_bytes: u64 = 0;

            if GetDiskFreeSpaceExW(
                wide_path.as_ptr(),
                &mut free_bytes_available as *mut u64 as *mut _,
                &mut _total_bytes as *mut u64 as *mut _,
                &mut _total_free_bytes as *mut u64 as *mut _,
            ) == 0
            {
                return Err(std::io::Error::last_os_error());
            }

            Ok(free_bytes_available)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "disk space checking is not supported on this platform",
        ))
    }
}
