//! Opening distribution archives
//!
//! - [`disk_image`]: `.dmg` files, mounted with `hdiutil`
//! - [`package`]: `.pkg` files, unpacked with `xar` and `tar`
//!
//! Opening yields an [`ArchiveHandle`] whose [`root`](ArchiveHandle::root) is
//! the tree to search. Mount points are released with the handle; package
//! extraction directories are kept on disk for inspection.

pub mod disk_image;
pub mod package;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::process::ToolRunner;
use crate::temp::{self, EXTRACT_PREFIX};

use disk_image::MountGuard;
use package::TreeSource;

/// Suffix of installer packages
pub const PACKAGE_SUFFIX: &str = ".pkg";

/// Kind of distribution archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    DiskImage,
    Package,
}

impl ArchiveKind {
    /// Detect the archive kind from the file extension, ignoring case
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "dmg" => Some(ArchiveKind::DiskImage),
            "pkg" => Some(ArchiveKind::Package),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveKind::DiskImage => write!(f, "disk image"),
            ArchiveKind::Package => write!(f, "package"),
        }
    }
}

/// An opened archive
#[derive(Debug)]
pub struct ArchiveHandle<'r> {
    kind: ArchiveKind,
    root: PathBuf,
    mount: Option<MountGuard<'r>>,
    extraction_dir: Option<PathBuf>,
    source: Option<TreeSource>,
}

impl ArchiveHandle<'_> {
    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Root of the extracted or mounted tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mount point of an attached disk image
    pub fn mount_point(&self) -> Option<&Path> {
        self.mount.as_ref().map(MountGuard::mount_point)
    }

    /// Extraction directory of an unpacked package
    pub fn extraction_dir(&self) -> Option<&Path> {
        self.extraction_dir.as_deref()
    }

    /// Which part of a package became the root
    pub fn tree_source(&self) -> Option<&TreeSource> {
        self.source.as_ref()
    }

    /// Release transient resources.
    ///
    /// Detaches a mounted disk image. A package extraction directory is left
    /// in place and returned so the caller can report it.
    pub fn release(mut self) -> Option<PathBuf> {
        if let Some(mount) = self.mount.as_mut() {
            mount.release();
        }
        self.extraction_dir.take()
    }
}

/// Open `path` as an archive of `kind`.
///
/// Package extraction directories are created under the configured temp base.
pub fn open<'r>(
    path: &Path,
    kind: ArchiveKind,
    runner: &'r dyn ToolRunner,
    config: &Config,
) -> Result<ArchiveHandle<'r>> {
    match kind {
        ArchiveKind::DiskImage => open_disk_image(path, runner, config),
        ArchiveKind::Package => {
            let extraction_dir = temp::create_persistent_dir(&config.temp_base, EXTRACT_PREFIX)?;
            open_package_in(path, &extraction_dir, runner)
        }
    }
}

/// Attach a disk image
pub fn open_disk_image<'r>(
    path: &Path,
    runner: &'r dyn ToolRunner,
    config: &Config,
) -> Result<ArchiveHandle<'r>> {
    let mount = disk_image::attach(path, runner, config)?;
    Ok(ArchiveHandle {
        kind: ArchiveKind::DiskImage,
        root: mount.mount_point().to_path_buf(),
        mount: Some(mount),
        extraction_dir: None,
        source: None,
    })
}

/// Unpack a package into an existing extraction directory
pub fn open_package_in<'r>(
    path: &Path,
    extraction_dir: &Path,
    runner: &'r dyn ToolRunner,
) -> Result<ArchiveHandle<'r>> {
    let unpacked = package::unpack(path, extraction_dir, runner)?;
    Ok(ArchiveHandle {
        kind: ArchiveKind::Package,
        root: unpacked.tree,
        mount: None,
        extraction_dir: Some(extraction_dir.to_path_buf()),
        source: Some(unpacked.source),
    })
}
