//! Icon conversion
//!
//! The output extension decides what is written:
//! - `.icns` (or an extension that is not a known raster format): a verbatim copy
//! - a raster extension: `sips`, falling back to decomposition (see [`fallback`])
//!   only when `sips` is not installed

pub mod fallback;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::config::Config;
use crate::error::{Result, convert::failed, fs::io_error};
use crate::process::{ToolOutcome, ToolRunner};

/// Raster formats an icon can be converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Gif,
}

impl RasterFormat {
    /// Format name understood by `sips -s format`
    pub fn sips_name(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpeg",
            RasterFormat::Tiff => "tiff",
            RasterFormat::Bmp => "bmp",
            RasterFormat::Gif => "gif",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Jpeg => ImageFormat::Jpeg,
            RasterFormat::Tiff => ImageFormat::Tiff,
            RasterFormat::Bmp => ImageFormat::Bmp,
            RasterFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// What an output path asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Copy the `.icns` file unchanged
    Native,
    Raster(RasterFormat),
}

impl OutputFormat {
    /// Decide from the extension of `output`, ignoring case
    pub fn from_path(output: &Path) -> Self {
        let ext = output
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        let raster = match ext.as_deref() {
            Some("png") => RasterFormat::Png,
            Some("jpg" | "jpeg") => RasterFormat::Jpeg,
            Some("tif" | "tiff") => RasterFormat::Tiff,
            Some("bmp") => RasterFormat::Bmp,
            Some("gif") => RasterFormat::Gif,
            _ => return OutputFormat::Native,
        };
        OutputFormat::Raster(raster)
    }
}

/// Which converter produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Copy,
    Sips,
    Iconutil,
    Library,
}

impl std::fmt::Display for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Converter::Copy => "copy",
            Converter::Sips => "sips",
            Converter::Iconutil => "iconutil",
            Converter::Library => "icns library",
        };
        f.write_str(name)
    }
}

/// A written output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub converter: Converter,
}

/// Write `icon` to `output` in the format its extension asks for
pub fn convert(
    icon: &Path,
    output: &Path,
    runner: &dyn ToolRunner,
    config: &Config,
) -> Result<ConversionResult> {
    create_parent_dirs(output)?;

    let format = OutputFormat::from_path(output);
    let converter = match format {
        OutputFormat::Native => {
            std::fs::copy(icon, output)
                .map_err(|e| io_error("Failed to copy icon to", output, e))?;
            Converter::Copy
        }
        OutputFormat::Raster(raster) => convert_raster(icon, output, raster, runner, config)?,
    };

    tracing::debug!(output = %output.display(), %converter, "icon written");
    Ok(ConversionResult {
        path: output.to_path_buf(),
        format,
        converter,
    })
}

fn create_parent_dirs(output: &Path) -> Result<()> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| io_error("Failed to create output directory", parent, e)),
        _ => Ok(()),
    }
}

fn convert_raster(
    icon: &Path,
    output: &Path,
    format: RasterFormat,
    runner: &dyn ToolRunner,
    config: &Config,
) -> Result<Converter> {
    tracing::debug!("converting icon using sips");
    let outcome = runner.run(
        "sips",
        &[
            OsStr::new("-s"),
            OsStr::new("format"),
            OsStr::new(format.sips_name()),
            icon.as_os_str(),
            OsStr::new("--out"),
            output.as_os_str(),
        ],
    );

    match outcome {
        ToolOutcome::Success(_) if output.is_file() => Ok(Converter::Sips),
        ToolOutcome::Success(_) => Err(failed(icon, "sips reported success but wrote no output")),
        // TODO: decide whether a failing sips should also fall back to decomposition
        failed_outcome @ ToolOutcome::Failed { .. } => {
            Err(failed(icon, failed_outcome.describe("sips")))
        }
        ToolOutcome::NotFound => {
            tracing::info!("sips not found, falling back to icon decomposition");
            fallback::convert(icon, output, format, runner, config)
        }
    }
}
