//! Bundle and icon discovery errors

use std::path::Path;

use super::{PkgIconError, display_path};

/// Creates a no bundle error for a searched tree
pub fn no_bundle(tree: &Path) -> PkgIconError {
    PkgIconError::NoBundle {
        path: display_path(tree),
    }
}

/// Creates a no icon error for a tree without any bundle or loose icon
pub fn no_icon(tree: &Path) -> PkgIconError {
    PkgIconError::NoIcon {
        path: display_path(tree),
        bundle: None,
    }
}

/// Creates a no icon error for a bundle whose declared icon is missing
pub fn bundle_without_icon(bundle: &Path) -> PkgIconError {
    let bundle = display_path(bundle);
    PkgIconError::NoIcon {
        path: bundle.clone(),
        bundle: Some(bundle),
    }
}
