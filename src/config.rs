//! Pipeline configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::temp;

/// Default bound on how deep bundle and icon searches descend
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default ceiling for detaching a disk image
pub const DEFAULT_UNMOUNT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest side of a raster produced by the decomposition fallback
pub const RASTER_MAX_DIMENSION: u32 = 300;

/// Tunables shared by every pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory under which mount points and extraction directories are created
    pub temp_base: PathBuf,
    /// Maximum walk depth when searching an extracted tree
    pub max_depth: usize,
    /// How long to wait for a disk image to detach
    pub unmount_timeout: Duration,
    /// Bounding box for rasters produced by the fallback converter
    pub raster_max_dimension: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_base: temp::temp_dir_base(),
            max_depth: DEFAULT_MAX_DEPTH,
            unmount_timeout: DEFAULT_UNMOUNT_TIMEOUT,
            raster_max_dimension: RASTER_MAX_DIMENSION,
        }
    }
}

impl Config {
    /// Use `base` for temporary directories
    #[must_use]
    pub fn with_temp_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.temp_base = base.into();
        self
    }

    /// Bound tree walks to `depth` levels
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Wait at most `timeout` for a disk image to detach
    #[must_use]
    pub fn with_unmount_timeout(mut self, timeout: Duration) -> Self {
        self.unmount_timeout = timeout;
        self
    }
}
