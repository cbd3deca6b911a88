//! Single-archive extraction pipeline
//!
//! `Start → Opened → Located → Converted → Done`, where any stage may end the
//! run with an error. Cleanup runs on every path: a mounted disk image is
//! detached, and a package extraction directory is kept on disk and reported
//! so a failed run can be inspected afterwards.

use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveHandle, ArchiveKind};
use crate::config::Config;
use crate::convert::{self, ConversionResult};
use crate::error::{
    Result,
    fs::{input_not_found, unsupported_archive},
};
use crate::locate::{self, IconResource, Located};
use crate::process::ToolRunner;
use crate::progress::Progress;
use crate::temp::{self, EXTRACT_PREFIX};

/// Pipeline stages, for logging and progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Opened,
    Located,
    Converted,
    Done,
}

impl Stage {
    fn message(self) -> &'static str {
        match self {
            Stage::Start => "Opening archive",
            Stage::Opened => "Searching for icon",
            Stage::Located => "Converting icon",
            Stage::Converted => "Cleaning up",
            Stage::Done => "Done",
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct Extraction {
    pub kind: ArchiveKind,
    pub icon: IconResource,
    pub output: ConversionResult,
    /// Package extraction directory left on disk
    pub temp_dir: Option<PathBuf>,
}

/// Extracts the icon of one archive at a time
pub struct Extractor<'r> {
    config: Config,
    runner: &'r dyn ToolRunner,
    progress: Progress,
    last_temp_dir: Option<PathBuf>,
}

impl<'r> Extractor<'r> {
    pub fn new(config: Config, runner: &'r dyn ToolRunner) -> Self {
        Self {
            config,
            runner,
            progress: Progress::hidden(),
            last_temp_dir: None,
        }
    }

    /// Report stage changes on `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Extraction directory of the most recent package run, successful or not
    pub fn last_temp_dir(&self) -> Option<&Path> {
        self.last_temp_dir.as_deref()
    }

    /// Extract the icon of `input` and write it to `output`
    pub fn extract(&mut self, input: &Path, output: &Path) -> Result<Extraction> {
        self.last_temp_dir = None;
        self.enter(Stage::Start);

        let handle = self
            .validate(input)
            .and_then(|kind| self.open(input, kind))
            .inspect_err(|_| self.progress.abandon())?;
        let kind = handle.kind();
        self.enter(Stage::Opened);

        let result = self.locate_and_convert(&handle, output);

        let kept = handle.release();
        if let Some(dir) = &kept {
            tracing::info!(dir = %dir.display(), "preserving temporary directory for debugging");
        }

        match result {
            Ok((located, converted)) => {
                self.enter(Stage::Done);
                self.progress.finish();
                Ok(Extraction {
                    kind,
                    icon: located.icon,
                    output: converted,
                    temp_dir: kept,
                })
            }
            Err(e) => {
                self.progress.abandon();
                Err(e)
            }
        }
    }

    fn validate(&self, input: &Path) -> Result<ArchiveKind> {
        if !input.exists() {
            return Err(input_not_found(input));
        }
        ArchiveKind::from_path(input).ok_or_else(|| unsupported_archive(input))
    }

    fn open(&mut self, input: &Path, kind: ArchiveKind) -> Result<ArchiveHandle<'r>> {
        tracing::debug!(input = %input.display(), %kind, "opening archive");
        match kind {
            ArchiveKind::DiskImage => archive::open_disk_image(input, self.runner, &self.config),
            ArchiveKind::Package => {
                let dir = temp::create_persistent_dir(&self.config.temp_base, EXTRACT_PREFIX)?;
                tracing::info!(dir = %dir.display(), "created temporary directory");
                self.last_temp_dir = Some(dir.clone());
                archive::open_package_in(input, &dir, self.runner)
            }
        }
    }

    fn locate_and_convert(
        &self,
        handle: &ArchiveHandle<'_>,
        output: &Path,
    ) -> Result<(Located, ConversionResult)> {
        let located = match handle.kind() {
            ArchiveKind::DiskImage => locate::require_bundle(handle.root(), self.config.max_depth),
            ArchiveKind::Package => locate::locate(handle.root(), self.config.max_depth),
        }?;
        self.enter(Stage::Located);

        let converted = convert::convert(&located.icon.path, output, self.runner, &self.config)?;
        self.enter(Stage::Converted);

        Ok((located, converted))
    }

    fn enter(&self, stage: Stage) {
        tracing::debug!(?stage, "pipeline stage");
        self.progress.set_message(stage.message());
    }
}
