//! Command line argument parsing

use crate::core::DownloadOptions;
use crate::platform::{FormatPolicy, HttpClientConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// vidget - download YouTube and Instagram videos
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a video from YouTube or Instagram
    Download(DownloadArgs),
}

/// Arguments of the `download` subcommand
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// YouTube or Instagram video URL
    pub url: String,

    /// Output directory (default: ~/Downloads/video-downloader)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// YouTube format selection policy
    #[arg(short, long, value_enum, default_value_t = FormatPolicy::Preferred)]
    pub format: FormatPolicy,

    /// Deadline for each whole request (e.g., 30s, 10m)
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<humantime::Duration>,

    /// Deadline for establishing a connection
    #[arg(long, value_name = "DURATION", default_value = "30s")]
    pub connect_timeout: humantime::Duration,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl DownloadArgs {
    /// Get the whole-request timeout as Duration
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Into::into)
    }

    /// Get the connect timeout as Duration
    pub fn connect_timeout_duration(&self) -> Duration {
        self.connect_timeout.into()
    }

    /// Downloader options described by these arguments
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            output_dir: self.output.clone(),
            http: HttpClientConfig {
                connect_timeout: self.connect_timeout_duration(),
                timeout: self.timeout_duration(),
                ..Default::default()
            },
        }
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}
