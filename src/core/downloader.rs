//! Main downloader implementation

use crate::core::progress::{Progress, ProgressCallback, ProgressTracker};
use crate::download::{save_stream, with_cancel, MediaStream};
use crate::error::DownloadError;
use crate::platform::{
    FormatSelection, HttpClientConfig, InnerTubeClient, InstagramClient, PreferredQualities,
    VideoMetadataService,
};
use crate::utils::{
    ensure_dir, provision_download_dir, timestamp_filename, title_filename, validate_url, Platform,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Callback invoked once a stream is open, with a label and the declared size
pub type StartCallback = Arc<dyn Fn(&str, u64) + Send + Sync>;

/// Main downloader configuration
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Directory receiving downloads; `<home>/Downloads/video-downloader` when unset
    pub output_dir: Option<PathBuf>,
    /// HTTP settings shared by every request
    pub http: HttpClientConfig,
}

/// Result of a finished download
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub platform: Platform,
    /// Video title, when the platform provides one
    pub title: Option<String>,
    /// File the video was written to
    pub path: PathBuf,
    /// Bytes written
    pub bytes: u64,
    /// Size declared by the server, 0 if unknown
    pub declared_size: u64,
}

/// Validates a URL, prepares the download directory and runs the matching extractor
pub struct Downloader {
    options: DownloadOptions,
    selection: Box<dyn FormatSelection>,
    metadata: Option<Box<dyn VideoMetadataService>>,
    progress_callback: Option<ProgressCallback>,
    start_callback: Option<StartCallback>,
    cancel: CancellationToken,
}

impl Downloader {
    /// Create a new downloader
    pub fn new() -> Self {
        Self {
            options: DownloadOptions::default(),
            selection: Box::new(PreferredQualities::default()),
            metadata: None,
            progress_callback: None,
            start_callback: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace all options
    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = Some(dir.into());
        self
    }

    /// Set the YouTube format selection strategy
    pub fn with_format_selection(mut self, selection: impl FormatSelection + 'static) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a boxed YouTube format selection strategy
    pub fn with_boxed_format_selection(mut self, selection: Box<dyn FormatSelection>) -> Self {
        self.selection = selection;
        self
    }

    /// Use a different YouTube metadata service
    pub fn with_metadata_service(mut self, service: impl VideoMetadataService + 'static) -> Self {
        self.metadata = Some(Box::new(service));
        self
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Set a callback for the moment a transfer starts
    pub fn with_start<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, u64) + Send + Sync + 'static,
    {
        self.start_callback = Some(Arc::new(callback));
        self
    }

    /// Abort every request and transfer once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Download the video at `url` into the download directory
    pub async fn download(&self, url: &str) -> Result<DownloadOutcome, DownloadError> {
        let platform = validate_url(url)?;
        let dir = self.prepare_output_dir().await?;
        self.download_to(platform, url, &dir).await
    }

    /// Run the extractor for `platform` against an already prepared directory
    pub async fn download_to(
        &self,
        platform: Platform,
        url: &str,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        info!("Downloading {} video to: {}", platform, dir.display());

        match platform {
            Platform::Youtube => self.download_youtube(url, dir).await,
            Platform::Instagram => self.download_instagram(url, dir).await,
        }
    }

    /// Create the configured output directory, or the default one under the home directory
    pub async fn prepare_output_dir(&self) -> Result<PathBuf, DownloadError> {
        match &self.options.output_dir {
            Some(dir) => {
                ensure_dir(dir).await?;
                Ok(dir.clone())
            }
            None => provision_download_dir().await,
        }
    }

    /// Download a YouTube video into `dir` as `<title>.mp4`
    pub async fn download_youtube(
        &self,
        url: &str,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        let default_service;
        let service: &dyn VideoMetadataService = match &self.metadata {
            Some(service) => service.as_ref(),
            None => {
                default_service = InnerTubeClient::new(&self.options.http)?;
                &default_service
            }
        };

        let video = with_cancel(&self.cancel, service.fetch_video(url)).await?;
        debug!(
            "{} of {} formats carry audio",
            video.formats_with_audio().len(),
            video.formats.len()
        );
        let format = self
            .selection
            .select(&video.formats)
            .ok_or(DownloadError::NoSuitableFormat)?;
        debug!(
            "Selected format: itag={}, quality={}, container={}",
            format.itag,
            format.quality,
            format.container()
        );

        let stream = with_cancel(&self.cancel, service.open_stream(format)).await?;
        let path = dir.join(title_filename(&video.title, "mp4"));

        let outcome = self
            .save(Platform::Youtube, stream, &path, &video.title)
            .await?;
        Ok(DownloadOutcome {
            title: Some(video.title),
            ..outcome
        })
    }

    /// Download an Instagram post video into `dir` as `instagram_video_<unix-seconds>.mp4`
    pub async fn download_instagram(
        &self,
        url: &str,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        let client = InstagramClient::new(&self.options.http)?;

        let video_url = with_cancel(&self.cancel, client.resolve_video_url(url)).await?;
        let stream = with_cancel(&self.cancel, client.open_video(&video_url)).await?;
        let path = dir.join(timestamp_filename(Utc::now()));

        self.save(Platform::Instagram, stream, &path, "Instagram video")
            .await
    }

    async fn save(
        &self,
        platform: Platform,
        stream: MediaStream,
        path: &Path,
        label: &str,
    ) -> Result<DownloadOutcome, DownloadError> {
        if let Some(callback) = &self.start_callback {
            callback(label, stream.size);
        }

        let mut tracker = ProgressTracker::new(stream.size, self.progress_callback.clone());
        let bytes = save_stream(stream.body, path, &mut tracker, &self.cancel).await?;
        if let Some(line) = tracker.progress().percent_line() {
            debug!("{}", line);
        }

        Ok(DownloadOutcome {
            platform,
            title: None,
            path: path.to_path_buf(),
            bytes,
            declared_size: stream.size,
        })
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}
