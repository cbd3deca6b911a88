//! pkgicon - extract the application icon from a macOS installer
//!
//! A disk image (`.dmg`) is attached with `hdiutil`; an installer package
//! (`.pkg`) is unpacked with `xar`, and its payload with `tar`. The first
//! application bundle found in the resulting tree names its icon in
//! `Contents/Info.plist`. That icon is copied as `.icns` or converted to a
//! raster format with `sips`, falling back to decomposition when `sips` is not
//! installed.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pkgicon::{Config, Extractor, SystemRunner};
//!
//! let runner = SystemRunner;
//! let mut extractor = Extractor::new(Config::default(), &runner);
//! let extraction = extractor
//!     .extract(Path::new("Firefox.dmg"), Path::new("firefox.png"))
//!     .unwrap();
//! println!("icon written by {}", extraction.output.converter);
//! ```

pub mod archive;
pub mod config;
pub mod convert;
pub mod error;
pub mod locate;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod temp;

#[cfg(test)]
mod test_fixtures;

pub use config::Config;
pub use error::{PkgIconError, Result};
pub use pipeline::{Extraction, Extractor};
pub use process::{SystemRunner, ToolOutcome, ToolRunner};
