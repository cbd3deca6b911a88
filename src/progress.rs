//! Spinner display for long-running pipeline stages

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while an archive is processed
pub struct Progress {
    spinner: ProgressBar,
}

impl Progress {
    /// Create a spinner on stderr labelled with the archive being processed
    pub fn spinner(archive_name: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {prefix} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_prefix(archive_name.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    /// A progress display that draws nothing
    pub fn hidden() -> Self {
        Self {
            spinner: ProgressBar::hidden(),
        }
    }

    /// Show the current stage
    pub fn set_message(&self, message: &'static str) {
        self.spinner.set_message(message);
    }

    /// Clear the spinner after a successful run
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    /// Leave the spinner on error
    pub fn abandon(&self) {
        self.spinner.abandon();
    }
}
