//! Temporary directory placement
//!
//! Extraction directories are created under an absolute base so they are never
//! created under the current working directory (e.g. when TMPDIR=tmp).

use std::env;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{Result, fs::io_error};

/// Prefix of package extraction directories
pub const EXTRACT_PREFIX: &str = "pkg_extract_";

/// Prefix of disk image mount points
pub const MOUNT_PREFIX: &str = "pkgicon_mount_";

/// Returns a directory path suitable for creating temporary directories.
/// Never returns a relative path.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create a fresh, uniquely named directory under `base` that outlives the run.
///
/// The name carries `prefix`, a local timestamp and a random suffix, so
/// concurrent runs started in the same second never collide.
pub fn create_persistent_dir(base: &Path, prefix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(base)
        .map_err(|e| io_error("Failed to create temporary base", base, e))?;

    let prefix = format!("{prefix}{}_", Local::now().format("%Y%m%d_%H%M%S"));
    let dir = tempfile::Builder::new()
        .prefix(&prefix)
        .tempdir_in(base)
        .map_err(|e| io_error("Failed to create temporary directory in", base, e))?;

    Ok(dir.keep())
}
