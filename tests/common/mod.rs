//! Common test utilities for pkgicon integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding inputs, outputs and the temp base
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the workspace, returning its path
    pub fn write_file(&self, path: &str, content: &[u8]) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Directory passed as `--temp-dir`
    pub fn temp_base(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// Entries created under the temp base whose names start with `prefix`
    pub fn temp_entries(&self, prefix: &str) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.temp_base()) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(prefix))
            })
            .collect()
    }
}
