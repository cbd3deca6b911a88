//! Test fixtures and utilities for reducing test setup duplication.
//!
//! Provides temp directories, `.icns` and `Info.plist` writers, and a
//! [`ScriptedRunner`] that stands in for the platform tools so archive layouts
//! can be simulated on any host.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{ScriptedRunner, create_temp_dir, write_icns};
//!
//! let temp = create_temp_dir();
//! let runner = ScriptedRunner::new().on_xar(|dir| {
//!     write_icns(&dir.join("Installer.icns"), 128);
//! });
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use crate::process::{ToolOutcome, ToolOutput, ToolRunner};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Write a single-resolution `.icns` file with a `size`x`size` image.
///
/// Parent directories are created as needed.
pub fn write_icns(path: &Path, size: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create icon directory");
    }
    let mut image = icns::Image::new(icns::PixelFormat::RGBA, size, size);
    for (i, byte) in image.data_mut().iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    let mut family = icns::IconFamily::new();
    family.add_icon(&image).expect("Failed to encode icon");
    let file = std::fs::File::create(path).expect("Failed to create icns file");
    family
        .write(std::io::BufWriter::new(file))
        .expect("Failed to write icns file");
}

/// Write a PNG of the given dimensions.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create image directory");
    }
    image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
        .save_with_format(path, image::ImageFormat::Png)
        .expect("Failed to write png");
}

/// Write `Contents/Info.plist` for a bundle, declaring `icon_file` when given.
pub fn write_info_plist(bundle: &Path, icon_file: Option<&str>) {
    let contents = bundle.join("Contents");
    std::fs::create_dir_all(&contents).expect("Failed to create Contents");

    let mut dict = plist::Dictionary::new();
    dict.insert(
        "CFBundleIdentifier".to_string(),
        plist::Value::String("com.example.app".to_string()),
    );
    if let Some(icon_file) = icon_file {
        dict.insert(
            "CFBundleIconFile".to_string(),
            plist::Value::String(icon_file.to_string()),
        );
    }
    plist::Value::Dictionary(dict)
        .to_file_xml(contents.join("Info.plist"))
        .expect("Failed to write Info.plist");
}

/// Create `<root>/<name>` as an app bundle with a manifest and its icon.
pub fn create_app_bundle(root: &Path, name: &str, icon_file: &str) -> PathBuf {
    let bundle = root.join(name);
    write_info_plist(&bundle, Some(icon_file));
    let icon_name = if icon_file.ends_with(".icns") {
        icon_file.to_string()
    } else {
        format!("{icon_file}.icns")
    };
    write_icns(&bundle.join("Contents/Resources").join(icon_name), 128);
    bundle
}

/// Outcome of a tool that exited with status zero and printed nothing
#[must_use]
pub fn success() -> ToolOutcome {
    ToolOutcome::Success(ToolOutput::default())
}

/// Outcome of a tool that exited with `code`
#[must_use]
pub fn failure(code: i32, diagnostics: &str) -> ToolOutcome {
    ToolOutcome::Failed {
        code: Some(code),
        diagnostics: diagnostics.to_string(),
    }
}

type Script = Box<dyn Fn(&[PathBuf]) -> ToolOutcome>;

/// A recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<PathBuf>,
    pub timeout: Option<Duration>,
}

/// [`ToolRunner`] answering from per-program scripts.
///
/// Programs without a script behave as if they were not installed.
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: HashMap<String, Script>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every invocation of `program` with `script`
    #[must_use]
    pub fn on(
        mut self,
        program: &str,
        script: impl Fn(&[PathBuf]) -> ToolOutcome + 'static,
    ) -> Self {
        self.scripts.insert(program.to_string(), Box::new(script));
        self
    }

    /// Simulate `xar -xf <pkg> -C <dir>` by populating `dir`
    #[must_use]
    pub fn on_xar(self, populate: impl Fn(&Path) + 'static) -> Self {
        self.on("xar", move |args| {
            populate(&args[3]);
            success()
        })
    }

    /// Simulate `tar -xf <payload> -C <dir>` by populating `dir` given the payload path
    #[must_use]
    pub fn on_tar(self, populate: impl Fn(&Path, &Path) + 'static) -> Self {
        self.on("tar", move |args| {
            populate(&args[1], &args[3]);
            success()
        })
    }

    /// Simulate `iconutil -c iconset <icns> -o <dir>` by populating `dir`
    #[must_use]
    pub fn on_iconutil(self, populate: impl Fn(&Path) + 'static) -> Self {
        self.on("iconutil", move |args| {
            std::fs::create_dir_all(&args[4]).unwrap();
            populate(&args[4]);
            success()
        })
    }

    /// Simulate a working `hdiutil` that exposes `populate`'d content at the mount point
    #[must_use]
    pub fn on_hdiutil(self, populate: impl Fn(&Path) + 'static) -> Self {
        self.on("hdiutil", move |args| {
            if args[0] == Path::new("attach") {
                populate(&args[3]);
            } else if args[0] == Path::new("detach") {
                for entry in std::fs::read_dir(&args[1]).unwrap() {
                    let path = entry.unwrap().path();
                    if path.is_dir() {
                        std::fs::remove_dir_all(path).unwrap();
                    } else {
                        std::fs::remove_file(path).unwrap();
                    }
                }
            }
            success()
        })
    }

    /// All invocations so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Invocations of `program` so far
    pub fn calls_to(&self, program: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn dispatch(&self, program: &str, args: &[&OsStr], timeout: Option<Duration>) -> ToolOutcome {
        let args: Vec<PathBuf> = args.iter().map(|a| PathBuf::from(*a)).collect();
        self.calls.borrow_mut().push(Call {
            program: program.to_string(),
            args: args.clone(),
            timeout,
        });
        match self.scripts.get(program) {
            Some(script) => script(&args),
            None => ToolOutcome::NotFound,
        }
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&OsStr]) -> ToolOutcome {
        self.dispatch(program, args, None)
    }

    fn run_with_timeout(&self, program: &str, args: &[&OsStr], timeout: Duration) -> ToolOutcome {
        self.dispatch(program, args, Some(timeout))
    }
}
