//! Bundle and icon discovery in an extracted tree
//!
//! Trees are walked depth-first with entries sorted by file name, so the same
//! layout always yields the same bundle. The first `.app` found wins; without
//! one, the first loose `.icns` file is used.

pub mod bundle;

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{
    Result,
    locate::{no_bundle, no_icon},
};

pub use bundle::AppBundle;

/// Suffix of application bundles
pub const APP_SUFFIX: &str = ".app";

/// Suffix of icon container files
pub const ICON_SUFFIX: &str = ".icns";

/// An icon file selected for conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResource {
    pub path: PathBuf,
    /// Bundle the icon was resolved through, if any
    pub bundle: Option<PathBuf>,
}

/// Outcome of a successful search
#[derive(Debug, Clone)]
pub struct Located {
    pub bundle: Option<AppBundle>,
    pub icon: IconResource,
}

/// Find the icon of `tree`: the first bundle's declared icon, or else the
/// first loose `.icns` file.
pub fn locate(tree: &Path, max_depth: usize) -> Result<Located> {
    tracing::debug!(tree = %tree.display(), "searching for .app bundle");

    if let Some(path) = find_app_bundle(tree, max_depth) {
        let bundle = AppBundle::load(&path);
        let icon = bundle.resolve_icon()?;
        return Ok(Located {
            bundle: Some(bundle),
            icon,
        });
    }

    tracing::info!("no .app bundle found, searching for icon files directly");
    match find_loose_icon(tree, max_depth) {
        Some(path) => Ok(Located {
            bundle: None,
            icon: IconResource { path, bundle: None },
        }),
        None => Err(no_icon(tree)),
    }
}

/// Like [`locate`], but a tree without a bundle is a `NoBundle` error
pub fn require_bundle(tree: &Path, max_depth: usize) -> Result<Located> {
    let path = find_app_bundle(tree, max_depth).ok_or_else(|| no_bundle(tree))?;
    let bundle = AppBundle::load(&path);
    let icon = bundle.resolve_icon()?;
    Ok(Located {
        bundle: Some(bundle),
        icon,
    })
}

/// First entry, directory or file, whose name ends in `.app`
pub fn find_app_bundle(tree: &Path, max_depth: usize) -> Option<PathBuf> {
    let found = walk(tree, max_depth)
        .find(|entry| has_suffix(entry, APP_SUFFIX))
        .map(DirEntry::into_path);
    if let Some(path) = &found {
        tracing::info!(bundle = %path.display(), "found .app bundle");
    }
    found
}

/// First file whose name ends in `.icns`
pub fn find_loose_icon(tree: &Path, max_depth: usize) -> Option<PathBuf> {
    let found = walk(tree, max_depth)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| has_suffix(entry, ICON_SUFFIX))
        .map(DirEntry::into_path);
    if let Some(path) = &found {
        tracing::info!(icon = %path.display(), "found icon file");
    }
    found
}

fn walk(tree: &Path, max_depth: usize) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(tree)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
}

fn has_suffix(entry: &DirEntry, suffix: &str) -> bool {
    entry.file_name().to_string_lossy().ends_with(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_DEPTH;
    use crate::error::PkgIconError;
    use crate::test_fixtures::{create_app_bundle, create_temp_dir, write_icns, write_info_plist};

    #[test]
    fn test_bundle_icon_is_found() {
        let temp = create_temp_dir();
        let bundle = create_app_bundle(&temp.path().join("Applications"), "App.app", "AppIcon");

        let located = locate(temp.path(), DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(located.bundle.unwrap().path(), bundle);
        assert_eq!(located.icon.path, bundle.join("Contents/Resources/AppIcon.icns"));
    }

    #[test]
    fn test_bundle_wins_over_loose_icon() {
        let temp = create_temp_dir();
        write_icns(&temp.path().join("AAA.icns"), 16);
        let bundle = create_app_bundle(temp.path(), "Zed.app", "Zed");

        let located = locate(temp.path(), DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(located.icon.bundle.as_deref(), Some(bundle.as_path()));
    }

    #[test]
    fn test_first_bundle_in_name_order_wins() {
        let temp = create_temp_dir();
        create_app_bundle(temp.path(), "Beta.app", "Beta");
        let alpha = create_app_bundle(temp.path(), "Alpha.app", "Alpha");

        assert_eq!(find_app_bundle(temp.path(), DEFAULT_MAX_DEPTH), Some(alpha));
    }

    #[test]
    fn test_outer_bundle_found_before_nested_helper() {
        let temp = create_temp_dir();
        let outer = create_app_bundle(temp.path(), "Main.app", "Main");
        create_app_bundle(&outer.join("Contents/Frameworks"), "Helper.app", "Helper");

        assert_eq!(find_app_bundle(temp.path(), DEFAULT_MAX_DEPTH), Some(outer));
    }

    #[test]
    fn test_bundle_named_file_is_accepted() {
        let temp = create_temp_dir();
        std::fs::write(temp.path().join("Odd.app"), "alias").unwrap();

        assert_eq!(
            find_app_bundle(temp.path(), DEFAULT_MAX_DEPTH),
            Some(temp.path().join("Odd.app"))
        );
    }

    #[test]
    fn test_bundle_without_icon_is_no_icon_not_loose_fallback() {
        let temp = create_temp_dir();
        write_info_plist(&temp.path().join("App.app"), Some("Missing"));
        write_icns(&temp.path().join("Installer.icns"), 16);

        let err = locate(temp.path(), DEFAULT_MAX_DEPTH).unwrap_err();

        assert!(matches!(err, PkgIconError::NoIcon { bundle: Some(_), .. }));
    }

    #[test]
    fn test_loose_icon_without_bundle() {
        let temp = create_temp_dir();
        write_icns(&temp.path().join("Installer.icns"), 16);

        let located = locate(temp.path(), DEFAULT_MAX_DEPTH).unwrap();

        assert!(located.bundle.is_none());
        assert_eq!(located.icon.path, temp.path().join("Installer.icns"));
        assert_eq!(located.icon.bundle, None);
    }

    #[test]
    fn test_empty_tree_is_no_icon() {
        let temp = create_temp_dir();
        std::fs::write(temp.path().join("README.txt"), "hello").unwrap();

        let err = locate(temp.path(), DEFAULT_MAX_DEPTH).unwrap_err();

        assert!(matches!(err, PkgIconError::NoIcon { bundle: None, .. }));
    }

    #[test]
    fn test_require_bundle_reports_no_bundle() {
        let temp = create_temp_dir();
        write_icns(&temp.path().join("Installer.icns"), 16);

        let err = require_bundle(temp.path(), DEFAULT_MAX_DEPTH).unwrap_err();

        assert!(matches!(err, PkgIconError::NoBundle { .. }));
    }

    #[test]
    fn test_search_respects_max_depth() {
        let temp = create_temp_dir();
        write_icns(&temp.path().join("a/b/c/deep.icns"), 16);

        assert_eq!(find_loose_icon(temp.path(), 3), None);
        assert_eq!(
            find_loose_icon(temp.path(), 4),
            Some(temp.path().join("a/b/c/deep.icns"))
        );
    }

    #[test]
    fn test_icns_directory_is_not_an_icon() {
        let temp = create_temp_dir();
        std::fs::create_dir_all(temp.path().join("Fake.icns")).unwrap();

        assert_eq!(find_loose_icon(temp.path(), DEFAULT_MAX_DEPTH), None);
    }
}
