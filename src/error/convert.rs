//! Icon conversion errors

use std::path::Path;

use super::{PkgIconError, display_path};

/// Creates a conversion failed error
pub fn failed(icon: &Path, reason: impl Into<String>) -> PkgIconError {
    PkgIconError::Conversion {
        path: display_path(icon),
        reason: reason.into(),
    }
}

/// Creates an error for a raster request with no usable converter
pub fn unsupported(icon: &Path) -> PkgIconError {
    PkgIconError::ConversionUnsupported {
        path: display_path(icon),
    }
}
