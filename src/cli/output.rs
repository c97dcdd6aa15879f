//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::progress::{format_megabytes, Progress};
use crate::error::DownloadError;
use crate::utils::Platform;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::{Arc, Mutex};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {bytes}/{total_bytes} ({eta}) {msg}";

/// Output formatter for vidget
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    show_progress: bool,
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_progress: true,
            progress_bar: Mutex::new(None),
        }
    }

    /// Never draw a progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn is_quiet(&self) -> bool {
        self.verbosity == VerbosityLevel::Quiet
    }

    /// Create a progress bar for a transfer of `total_size` bytes.
    ///
    /// Returns `None` when the size is unknown, in quiet mode, or with
    /// progress disabled.
    pub fn create_progress_bar(&self, total_size: u64) -> Option<ProgressBar> {
        if self.is_quiet() || !self.show_progress || total_size == 0 {
            return None;
        }

        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let progress_bar = ProgressBar::new(total_size);
        progress_bar.set_style(style);

        if let Ok(mut slot) = self.progress_bar.lock() {
            *slot = Some(progress_bar.clone());
        }
        Some(progress_bar)
    }

    /// Update progress bar
    pub fn update_progress(&self, progress: &Progress) {
        if let Ok(slot) = self.progress_bar.lock() {
            if let Some(progress_bar) = slot.as_ref() {
                progress_bar.set_position(progress.downloaded_size);
                progress_bar.set_message(progress.speed_string());
            }
        }
    }

    /// Finish progress bar
    pub fn finish_progress(&self) {
        if let Ok(mut slot) = self.progress_bar.lock() {
            if let Some(progress_bar) = slot.take() {
                progress_bar.finish();
            }
        }
    }

    /// Drop the progress bar without leaving it on screen
    pub fn abandon_progress(&self) {
        if let Ok(mut slot) = self.progress_bar.lock() {
            if let Some(progress_bar) = slot.take() {
                progress_bar.abandon();
            }
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if !self.is_quiet() {
            println!("{}", message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            println!("{}", message.dimmed());
        }
    }

    /// Print the URL being validated
    pub fn print_validating(&self, url: &str) {
        self.info(&format!("Validating URL: {}", url));
    }

    /// Print the platform and target directory
    pub fn print_download_target(&self, platform: Platform, dir: &Path) {
        self.info(&format!(
            "Downloading {} video to: {}",
            platform,
            dir.display()
        ));
    }

    /// Print what is about to be transferred and set up the progress bar
    pub fn print_transfer_start(&self, label: &str, size: u64) {
        if self.is_quiet() {
            return;
        }

        println!("Downloading: {}", label.bold());
        println!("Size: {}", format_megabytes(size));
        self.create_progress_bar(size);
    }

    /// Print download complete message
    pub fn print_download_complete(&self, path: &Path) {
        self.finish_progress();
        if self.is_quiet() {
            return;
        }

        println!("{} {}", "Video downloaded:".green(), path.display());
    }

    /// Print a failed download
    pub fn print_failure(&self, error: &DownloadError) {
        self.abandon_progress();
        if error.is_cancelled() {
            self.error("Download cancelled");
        } else {
            self.error(&error.to_string());
        }
    }
}

/// Create a progress callback for the downloader
pub fn create_progress_callback(
    formatter: Arc<OutputFormatter>,
) -> impl Fn(&Progress) + Send + Sync + 'static {
    move |progress: &Progress| {
        formatter.update_progress(progress);
    }
}

/// Create a transfer-start callback for the downloader
pub fn create_start_callback(
    formatter: Arc<OutputFormatter>,
) -> impl Fn(&str, u64) + Send + Sync + 'static {
    move |label: &str, size: u64| {
        formatter.print_transfer_start(label, size);
    }
}
