//! pkgicon command line entry point

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use pkgicon::progress::Progress;
use pkgicon::{Extractor, SystemRunner};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting pkgicon");

    let runner = SystemRunner;
    let mut extractor = Extractor::new(cli.config(), &runner);
    if !cli.quiet && !cli.verbose {
        let name = cli
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        extractor = extractor.with_progress(Progress::spinner(&name));
    }

    match extractor.extract(&cli.input, &cli.output) {
        Ok(extraction) => {
            if !cli.quiet {
                println!(
                    "{} {}",
                    style("Icon successfully extracted to:").green().bold(),
                    extraction.output.path.display()
                );
                if let Some(dir) = &extraction.temp_dir {
                    println!(
                        "{}",
                        style(format!("Temporary files kept at: {}", dir.display())).dim()
                    );
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = ?e, "extraction failed");
            eprintln!("Error: {e}");
            if let Some(dir) = extractor.last_temp_dir() {
                eprintln!("Temporary files kept at: {}", dir.display());
            }
            std::process::exit(1);
        }
    }
}

/// Initialize the tracing subscriber.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pkgicon=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pkgicon=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
