//! Error types and handling for pkgicon
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by pipeline stage:
//! - [`archive`]: Mounting and unpacking errors
//! - [`locate`]: Bundle and icon discovery errors
//! - [`convert`]: Icon conversion errors
//! - [`fs`]: File system and input errors

pub mod archive;
pub mod convert;
pub mod fs;
pub mod locate;


use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pkgicon operations
#[derive(Error, Diagnostic, Debug)]
pub enum PkgIconError {
    // Archive errors
    #[error("Failed to mount disk image: {path}: {reason}")]
    #[diagnostic(
        code(pkgicon::archive::mount_failed),
        help("Check that the disk image is not corrupted and `hdiutil` is available")
    )]
    Mount { path: String, reason: String },

    #[error("Failed to extract package: {path}: {diagnostics}")]
    #[diagnostic(
        code(pkgicon::archive::extraction_failed),
        help("The temporary extraction directory is kept for inspection")
    )]
    Extraction { path: String, diagnostics: String },

    // Locate errors
    #[error("No .app bundle found in {path}")]
    #[diagnostic(code(pkgicon::locate::no_bundle))]
    NoBundle { path: String },

    #[error("No icon found in {path}")]
    #[diagnostic(
        code(pkgicon::locate::no_icon),
        help("Neither an application bundle icon nor a loose .icns file could be resolved")
    )]
    NoIcon {
        path: String,
        bundle: Option<String>,
    },

    // Conversion errors
    #[error("Failed to convert icon {path}: {reason}")]
    #[diagnostic(code(pkgicon::convert::failed))]
    Conversion { path: String, reason: String },

    #[error("Cannot convert icon {path} to a raster image on this system")]
    #[diagnostic(
        code(pkgicon::convert::unsupported),
        help(
            "Install `sips` or `iconutil`, build with the `icns-fallback` feature, or request a .icns output"
        )
    )]
    ConversionUnsupported { path: String },

    // File system errors
    #[error("Input file does not exist: {path}")]
    #[diagnostic(code(pkgicon::fs::input_not_found))]
    InputNotFound { path: String },

    #[error("Unsupported archive: {path}")]
    #[diagnostic(
        code(pkgicon::fs::unsupported_archive),
        help("Input file must be a .dmg or .pkg")
    )]
    UnsupportedArchive { path: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pkgicon::fs::io_error))]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<std::io::Error> for PkgIconError {
    fn from(err: std::io::Error) -> Self {
        PkgIconError::Io {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PkgIconError>;

/// Lossy display form used in error payloads
pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
