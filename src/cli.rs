//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pkgicon::config::{Config, DEFAULT_MAX_DEPTH, DEFAULT_UNMOUNT_TIMEOUT};

/// pkgicon - extract the application icon from a macOS installer
#[derive(Parser, Debug)]
#[command(
    name = "pkgicon",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Extract the application icon from a macOS .dmg or .pkg",
    long_about = "pkgicon opens a disk image (.dmg) or installer package (.pkg), finds the \
                  application bundle inside it and writes that bundle's icon. An output ending \
                  in .icns receives the icon unchanged; .png, .jpg, .tiff, .bmp and .gif \
                  outputs are converted.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  pkgicon Firefox.dmg firefox.icns\n    \
                  pkgicon Installer.pkg icon.png\n    \
                  pkgicon -v --temp-dir ./scratch Installer.pkg icon.png"
)]
pub struct Cli {
    /// Disk image (.dmg) or installer package (.pkg)
    pub input: PathBuf,

    /// Where to write the icon; the extension selects the format
    pub output: PathBuf,

    /// Enable verbose output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print nothing on success
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Directory for mount points and extraction directories
    #[arg(long, value_name = "DIR", env = "PKGICON_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// How many directory levels to search for bundles and icons
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Seconds to wait for a disk image to detach
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_UNMOUNT_TIMEOUT.as_secs())]
    pub unmount_timeout: u64,
}

impl Cli {
    /// Pipeline configuration from the parsed options
    pub fn config(&self) -> Config {
        let config = Config::default()
            .with_max_depth(self.max_depth)
            .with_unmount_timeout(Duration::from_secs(self.unmount_timeout));
        match &self.temp_dir {
            Some(dir) => config.with_temp_base(absolute(dir)),
            None => config,
        }
    }
}

fn absolute(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}
