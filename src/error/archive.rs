//! Archive opening errors

use std::path::Path;

use super::{PkgIconError, display_path};

/// Creates a mount failed error
pub fn mount_failed(path: &Path, reason: impl Into<String>) -> PkgIconError {
    PkgIconError::Mount {
        path: display_path(path),
        reason: reason.into(),
    }
}

/// Creates an extraction failed error carrying the unpacking tool's output
pub fn extraction_failed(path: &Path, diagnostics: impl Into<String>) -> PkgIconError {
    PkgIconError::Extraction {
        path: display_path(path),
        diagnostics: diagnostics.into(),
    }
}
