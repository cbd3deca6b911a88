//! Application bundles and their declared icon

use std::path::{Path, PathBuf};

use crate::error::{Result, locate::bundle_without_icon};

use super::{ICON_SUFFIX, IconResource};

/// Manifest location inside a bundle
pub const MANIFEST_PATH: &str = "Contents/Info.plist";

/// Resources directory inside a bundle
pub const RESOURCES_DIR: &str = "Contents/Resources";

/// Manifest key naming the bundle icon
pub const ICON_FILE_KEY: &str = "CFBundleIconFile";

/// An application bundle found in an extracted tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppBundle {
    path: PathBuf,
    icon_file: String,
}

impl AppBundle {
    /// Load the bundle at `path`, resolving its icon file name.
    ///
    /// A missing or unreadable manifest, or one without `CFBundleIconFile`,
    /// falls back to the bundle's own name.
    pub fn load(path: &Path) -> Self {
        let declared = read_icon_file(&path.join(MANIFEST_PATH));
        let name = declared.unwrap_or_else(|| bundle_name(path));
        let icon_file = if name.ends_with(ICON_SUFFIX) {
            name
        } else {
            format!("{name}{ICON_SUFFIX}")
        };

        Self {
            path: path.to_path_buf(),
            icon_file,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Icon file name, always ending in `.icns`
    pub fn icon_file(&self) -> &str {
        &self.icon_file
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.path.join(RESOURCES_DIR)
    }

    /// Where the declared icon should be, whether or not it exists
    pub fn icon_candidate(&self) -> PathBuf {
        self.resources_dir().join(&self.icon_file)
    }

    /// Resolve the declared icon on disk
    pub fn resolve_icon(&self) -> Result<IconResource> {
        let candidate = self.icon_candidate();
        if candidate.is_file() {
            tracing::info!(icon = %candidate.display(), "found bundle icon");
            Ok(IconResource {
                path: candidate,
                bundle: Some(self.path.clone()),
            })
        } else {
            tracing::warn!(icon = %candidate.display(), "declared bundle icon does not exist");
            Err(bundle_without_icon(&self.path))
        }
    }
}

fn bundle_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_icon_file(manifest: &Path) -> Option<String> {
    if !manifest.is_file() {
        tracing::debug!(manifest = %manifest.display(), "bundle has no manifest");
        return None;
    }

    let value = match plist::Value::from_file(manifest) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(manifest = %manifest.display(), error = %e, "error reading plist");
            return None;
        }
    };

    value
        .as_dictionary()
        .and_then(|dict| dict.get(ICON_FILE_KEY))
        .and_then(plist::Value::as_string)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
