//! File system errors

use std::path::Path;

use super::{PkgIconError, display_path};

/// Creates an IO error with operation context
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> PkgIconError {
    PkgIconError::Io {
        message: format!("{operation} {}: {err}", path.display()),
        source: Some(Box::new(err)),
    }
}

/// Creates an input not found error
pub fn input_not_found(path: &Path) -> PkgIconError {
    PkgIconError::InputNotFound {
        path: display_path(path),
    }
}

/// Creates an unsupported archive error
pub fn unsupported_archive(path: &Path) -> PkgIconError {
    PkgIconError::UnsupportedArchive {
        path: display_path(path),
    }
}
