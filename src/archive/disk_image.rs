//! Disk image attach and detach
//!
//! A disk image is attached with `hdiutil` at a freshly created mount point.
//! The returned [`MountGuard`] detaches it and removes the mount point exactly
//! once, either through [`MountGuard::release`] or when dropped.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, archive::mount_failed, fs::io_error};
use crate::process::{ToolOutcome, ToolRunner};
use crate::temp::{self, MOUNT_PREFIX};

const HDIUTIL: &str = "hdiutil";

/// Attach `image` at a new mount point under the configured temp base
pub fn attach<'r>(
    image: &Path,
    runner: &'r dyn ToolRunner,
    config: &Config,
) -> Result<MountGuard<'r>> {
    let mount_point = temp::create_persistent_dir(&config.temp_base, MOUNT_PREFIX)?;

    let outcome = runner.run(
        HDIUTIL,
        &[
            OsStr::new("attach"),
            image.as_os_str(),
            OsStr::new("-mountpoint"),
            mount_point.as_os_str(),
            OsStr::new("-nobrowse"),
            OsStr::new("-quiet"),
        ],
    );

    match outcome {
        ToolOutcome::Success(_) => {
            tracing::info!(image = %image.display(), mount_point = %mount_point.display(), "mounted disk image");
            Ok(MountGuard {
                mount_point,
                runner,
                timeout: config.unmount_timeout,
                released: false,
            })
        }
        failed => {
            if let Err(e) = std::fs::remove_dir(&mount_point) {
                tracing::warn!(mount_point = %mount_point.display(), error = %e, "failed to remove unused mount point");
            }
            Err(mount_failed(image, failed.describe(HDIUTIL)))
        }
    }
}

/// An attached disk image that must be detached
pub struct MountGuard<'r> {
    mount_point: PathBuf,
    runner: &'r dyn ToolRunner,
    timeout: Duration,
    released: bool,
}

impl std::fmt::Debug for MountGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountGuard")
            .field("mount_point", &self.mount_point)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl MountGuard<'_> {
    /// Directory the image is mounted at
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Whether the image has been detached already
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Detach the image and remove the mount point.
    ///
    /// Failures are logged, never returned: a stuck mount must not hide the
    /// error that ended the run.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if !self.mount_point.exists() {
            return;
        }

        let outcome = self.runner.run_with_timeout(
            HDIUTIL,
            &[
                OsStr::new("detach"),
                self.mount_point.as_os_str(),
                OsStr::new("-quiet"),
            ],
            self.timeout,
        );
        match outcome {
            ToolOutcome::Success(_) => {
                tracing::debug!(mount_point = %self.mount_point.display(), "detached disk image");
            }
            failed => {
                tracing::warn!(
                    mount_point = %self.mount_point.display(),
                    "error during unmount: {}",
                    failed.describe(HDIUTIL)
                );
            }
        }

        if let Err(e) = std::fs::remove_dir(&self.mount_point) {
            let err = io_error("Failed to remove mount point", &self.mount_point, e);
            tracing::warn!("{err}");
        }
    }
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
