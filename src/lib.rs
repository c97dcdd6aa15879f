//! # vidget - YouTube and Instagram video downloader
//!
//! Validates a video URL, provisions a download directory and streams the
//! video to disk with progress reporting.
//!
//! ## Features
//!
//! - YouTube downloads through the InnerTube player API
//! - Instagram post videos scraped from the embedded page data
//! - Pluggable format selection
//! - Cancellation and request deadlines
//!
//! ## Example
//!
//! ```rust,no_run
//! use vidget::Downloader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Downloader::new().with_output_dir("./downloads");
//!
//!     let outcome = downloader.download("VIDEO_URL").await?;
//!     println!("Downloaded: {}", outcome.path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod download;
pub mod error;
pub mod platform;
pub mod utils;

// Re-export main types
pub use crate::core::{DownloadOptions, DownloadOutcome, Downloader, Format, Progress, VideoInfo};
pub use error::{DownloadError, ErrorCategory};
pub use platform::{FormatPolicy, FormatSelection};
pub use utils::Platform;

/// Result type alias for vidget operations
pub type Result<T> = std::result::Result<T, DownloadError>;
