//! Raster conversion without `sips`
//!
//! The icon is decomposed into one PNG per resolution, with `iconutil` when it
//! is installed and otherwise in process with the `icns` crate. The largest
//! image is scaled to fit the configured bound and saved in the requested
//! format. Decomposed images live in a scratch directory removed on return.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::imageops::FilterType;

use crate::config::Config;
use crate::error::{Result, convert::failed, fs::io_error};
use crate::process::{ToolOutcome, ToolRunner};

use super::{Converter, RasterFormat};

/// Convert `icon` to `output` by decomposition
pub fn convert(
    icon: &Path,
    output: &Path,
    format: RasterFormat,
    runner: &dyn ToolRunner,
    config: &Config,
) -> Result<Converter> {
    std::fs::create_dir_all(&config.temp_base)
        .map_err(|e| io_error("Failed to create temporary base", &config.temp_base, e))?;
    let scratch = tempfile::Builder::new()
        .prefix("pkgicon_iconset_")
        .tempdir_in(&config.temp_base)
        .map_err(|e| io_error("Failed to create scratch directory in", &config.temp_base, e))?;
    let iconset = scratch.path().join("icon.iconset");

    let converter = decompose(icon, &iconset, runner)?;

    let Some(largest) = largest_image(&iconset)? else {
        return Err(failed(icon, "icon contains no decodable images"));
    };
    tracing::debug!(image = %largest.display(), "selected largest decomposed image");

    let source = image::open(&largest)
        .map_err(|e| failed(icon, format!("failed to open {}: {e}", largest.display())))?;
    let resized = fit_within(&source, config.raster_max_dimension);
    save(&resized, output, format).map_err(|e| failed(icon, e.to_string()))?;

    tracing::info!(output = %output.display(), %converter, "converted icon by decomposition");
    Ok(converter)
}

fn decompose(icon: &Path, iconset: &Path, runner: &dyn ToolRunner) -> Result<Converter> {
    let outcome = runner.run(
        "iconutil",
        &[
            OsStr::new("-c"),
            OsStr::new("iconset"),
            icon.as_os_str(),
            OsStr::new("-o"),
            iconset.as_os_str(),
        ],
    );

    match outcome {
        ToolOutcome::Success(_) => Ok(Converter::Iconutil),
        ToolOutcome::NotFound => decompose_in_process(icon, iconset),
        failed_outcome @ ToolOutcome::Failed { .. } => {
            Err(failed(icon, failed_outcome.describe("iconutil")))
        }
    }
}

#[cfg(feature = "icns-fallback")]
fn decompose_in_process(icon: &Path, iconset: &Path) -> Result<Converter> {
    use std::fs::File;
    use std::io::{BufReader, BufWriter};

    tracing::debug!("iconutil not found, decoding icon in process");

    let file = File::open(icon).map_err(|e| io_error("Failed to open", icon, e))?;
    let family = icns::IconFamily::read(BufReader::new(file))
        .map_err(|e| failed(icon, format!("invalid icon file: {e}")))?;
    std::fs::create_dir_all(iconset).map_err(|e| io_error("Failed to create", iconset, e))?;

    for icon_type in family.available_icons() {
        let image = match family.get_icon_with_type(icon_type) {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!(?icon_type, error = %e, "skipping undecodable icon");
                continue;
            }
        };
        let path = iconset.join(format!(
            "{}_{}x{}.png",
            icon_type.ostype(),
            image.width(),
            image.height()
        ));
        let file = File::create(&path).map_err(|e| io_error("Failed to create", &path, e))?;
        image
            .write_png(BufWriter::new(file))
            .map_err(|e| io_error("Failed to write", &path, e))?;
    }

    Ok(Converter::Library)
}

#[cfg(not(feature = "icns-fallback"))]
fn decompose_in_process(icon: &Path, _iconset: &Path) -> Result<Converter> {
    tracing::warn!("iconutil not found and in-process decoding is not compiled in");
    Err(crate::error::convert::unsupported(icon))
}

/// PNG with the greatest pixel area in `dir`; ties go to the first in name order
fn largest_image(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut pngs = std::fs::read_dir(dir)
        .map_err(|e| io_error("Failed to read", dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(OsStr::to_str)
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect::<Vec<_>>();
    pngs.sort();

    let mut largest: Option<(u64, PathBuf)> = None;
    for path in pngs {
        let (width, height) = match image::image_dimensions(&path) {
            Ok(dims) => dims,
            Err(e) => {
                tracing::warn!(image = %path.display(), error = %e, "skipping unreadable image");
                continue;
            }
        };
        let area = u64::from(width) * u64::from(height);
        if largest.as_ref().is_none_or(|(best, _)| area > *best) {
            largest = Some((area, path));
        }
    }

    Ok(largest.map(|(_, path)| path))
}

/// Scale `image` so it fits in a `bound`x`bound` box, keeping its aspect ratio
pub fn fit_within(image: &DynamicImage, bound: u32) -> DynamicImage {
    image.resize(bound, bound, FilterType::Lanczos3)
}

fn save(image: &DynamicImage, output: &Path, format: RasterFormat) -> image::ImageResult<()> {
    match format {
        // JPEG has no alpha channel
        RasterFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .save_with_format(output, format.image_format()),
        _ => image.save_with_format(output, format.image_format()),
    }
}
