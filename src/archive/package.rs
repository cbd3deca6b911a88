//! Installer package unpacking
//!
//! A package is a xar archive. Its top level may hold a `Payload` stream, or a
//! nested `*.pkg` directory with its own `Payload` (component packages inside
//! a product archive). Nesting is resolved one level deep, explicitly:
//!
//! 1. the first nested package (in name order) that carries a `Payload`
//! 2. the top-level `Payload`
//! 3. the raw unpacked directory

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Result, archive::extraction_failed, fs::io_error};
use crate::process::{ToolOutcome, ToolRunner};

use super::PACKAGE_SUFFIX;

/// Name of the payload stream inside a package
pub const PAYLOAD: &str = "Payload";

/// Directory a nested package's payload is unpacked under
pub const NESTED_EXTRACT_DIR: &str = "nested_pkg_extract";

/// Directory a payload is unpacked into
pub const PAYLOAD_EXTRACT_DIR: &str = "PayloadExtracted";

/// Where the effective tree of a package came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    /// Payload of the named nested package
    NestedPayload(String),
    /// The package's own top-level payload
    Payload,
    /// The unpacked package itself, no payload found
    Raw,
}

/// Result of unpacking a package
#[derive(Debug, Clone)]
pub struct UnpackedPackage {
    /// Root of the tree to search for bundles and icons
    pub tree: PathBuf,
    pub source: TreeSource,
}

/// Unpack `package` into the existing, empty `extraction_dir`
pub fn unpack(
    package: &Path,
    extraction_dir: &Path,
    runner: &dyn ToolRunner,
) -> Result<UnpackedPackage> {
    tracing::debug!(package = %package.display(), dir = %extraction_dir.display(), "extracting package with xar");

    let outcome = runner.run(
        "xar",
        &[
            OsStr::new("-xf"),
            package.as_os_str(),
            OsStr::new("-C"),
            extraction_dir.as_os_str(),
        ],
    );
    match outcome {
        ToolOutcome::Success(output) => {
            if !output.stderr.trim().is_empty() {
                tracing::warn!("warning during package extraction: {}", output.stderr.trim());
            }
        }
        failed => return Err(extraction_failed(package, failed.describe("xar"))),
    }

    let entries = sorted_entries(extraction_dir)?;
    tracing::debug!(?entries, "initial package contents");

    for nested in entries.iter().filter(|p| is_nested_package(p)) {
        let payload = nested.join(PAYLOAD);
        if !payload.is_file() {
            tracing::debug!(nested = %nested.display(), "nested package has no payload");
            continue;
        }

        tracing::info!(nested = %nested.display(), "found payload in nested package");
        let target = extraction_dir
            .join(NESTED_EXTRACT_DIR)
            .join(PAYLOAD_EXTRACT_DIR);
        unpack_payload(package, &payload, &target, runner)?;

        let name = nested
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(UnpackedPackage {
            tree: target,
            source: TreeSource::NestedPayload(name),
        });
    }

    let payload = extraction_dir.join(PAYLOAD);
    if payload.is_file() {
        tracing::info!("found payload in package");
        let target = extraction_dir.join(PAYLOAD_EXTRACT_DIR);
        unpack_payload(package, &payload, &target, runner)?;
        return Ok(UnpackedPackage {
            tree: target,
            source: TreeSource::Payload,
        });
    }

    tracing::info!("no payload found, searching the unpacked package");
    Ok(UnpackedPackage {
        tree: extraction_dir.to_path_buf(),
        source: TreeSource::Raw,
    })
}

fn is_nested_package(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(PACKAGE_SUFFIX))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read = std::fs::read_dir(dir).map_err(|e| io_error("Failed to read", dir, e))?;
    let mut entries = read
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| io_error("Failed to read", dir, e))?;
    entries.sort();
    Ok(entries)
}

fn unpack_payload(
    package: &Path,
    payload: &Path,
    target: &Path,
    runner: &dyn ToolRunner,
) -> Result<()> {
    std::fs::create_dir_all(target).map_err(|e| io_error("Failed to create", target, e))?;

    let outcome = runner.run(
        "tar",
        &[
            OsStr::new("-xf"),
            payload.as_os_str(),
            OsStr::new("-C"),
            target.as_os_str(),
        ],
    );
    match outcome {
        ToolOutcome::Success(_) => {
            tracing::debug!(payload = %payload.display(), target = %target.display(), "extracted payload");
            Ok(())
        }
        failed => Err(extraction_failed(package, failed.describe("tar"))),
    }
}
