//! Error types for vidget

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vidget operations
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL: {0}")]
    UnsupportedPlatform(String),

    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("Failed to create download directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error getting video info: {0}")]
    MetadataFetch(String),

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("No suitable video format found")]
    NoSuitableFormat,

    #[error("Error getting video stream: {0}")]
    StreamOpen(String),

    #[error("Error creating file {path}: {source}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing video to disk: {0}")]
    Write(#[source] std::io::Error),

    #[error("Connection lost while downloading: {0}")]
    StreamRead(#[source] reqwest::Error),

    #[error("Error fetching Instagram page: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("Could not find shared data in Instagram page")]
    SharedDataNotFound,

    #[error("Error parsing JSON data: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Could not find entry_data in JSON")]
    EntryDataMissing,

    #[error("Could not find PostPage in JSON")]
    PostPageMissing,

    #[error("Could not find post data in JSON")]
    PostDataMissing,

    #[error("Could not find graphql data in JSON")]
    GraphQlMissing,

    #[error("Could not find shortcode_media in JSON")]
    ShortcodeMediaMissing,

    #[error("Could not find video_url in JSON")]
    VideoUrlMissing,

    #[error("Error downloading video: {0}")]
    VideoFetch(#[source] reqwest::Error),

    #[error("Download cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Broad classification of a failure, used for reporting and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Url,
    Filesystem,
    Network,
    Extraction,
    FormatSelection,
    Cancelled,
}

impl DownloadError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            DownloadError::InvalidUrl { .. } | DownloadError::UnsupportedPlatform(_) => {
                ErrorCategory::Url
            }
            DownloadError::NoHomeDirectory
            | DownloadError::DirectoryCreate { .. }
            | DownloadError::FileCreate { .. }
            | DownloadError::Write(_) => ErrorCategory::Filesystem,
            DownloadError::MetadataFetch(_)
            | DownloadError::VideoUnavailable(_)
            | DownloadError::StreamOpen(_)
            | DownloadError::StreamRead(_)
            | DownloadError::Fetch(_)
            | DownloadError::VideoFetch(_)
            | DownloadError::HttpClient(_) => ErrorCategory::Network,
            DownloadError::SharedDataNotFound
            | DownloadError::JsonParse(_)
            | DownloadError::EntryDataMissing
            | DownloadError::PostPageMissing
            | DownloadError::PostDataMissing
            | DownloadError::GraphQlMissing
            | DownloadError::ShortcodeMediaMissing
            | DownloadError::VideoUrlMissing
            | DownloadError::Pattern(_) => ErrorCategory::Extraction,
            DownloadError::NoSuitableFormat => ErrorCategory::FormatSelection,
            DownloadError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Check if the download was interrupted by the user
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}
