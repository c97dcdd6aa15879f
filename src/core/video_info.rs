//! Video information structures

use serde::{Deserialize, Serialize};

/// Video information and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// YouTube video ID
    pub id: String,
    /// Video title
    pub title: String,
    /// Video author/channel name
    pub author: String,
    /// Video duration in seconds
    pub duration: u32,
    /// Available formats, in the order the service listed them
    pub formats: Vec<Format>,
}

impl VideoInfo {
    /// Create a new VideoInfo
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            author: String::new(),
            duration: 0,
            formats: Vec::new(),
        }
    }

    /// Formats that carry at least one audio channel
    pub fn formats_with_audio(&self) -> Vec<&Format> {
        self.formats.iter().filter(|f| f.has_audio()).collect()
    }
}

/// Video format information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    /// YouTube format ID (itag)
    pub itag: u32,
    /// Direct download URL, absent for signature-protected formats
    pub url: Option<String>,
    /// Quality tier (e.g., "hd720", "medium")
    pub quality: String,
    /// Display label (e.g., "720p")
    pub quality_label: Option<String>,
    /// MIME type including codecs
    pub mime_type: String,
    /// Bitrate in bits per second
    pub bitrate: u32,
    /// File size in bytes (if known)
    pub size: Option<u64>,
    /// Audio channels, 0 or absent for video-only streams
    pub audio_channels: Option<u32>,
}

impl Format {
    /// Create a new Format
    pub fn new(itag: u32, quality: &str, mime_type: &str) -> Self {
        Self {
            itag,
            url: None,
            quality: quality.to_string(),
            quality_label: None,
            mime_type: mime_type.to_string(),
            bitrate: 0,
            size: None,
            audio_channels: None,
        }
    }

    /// Set the number of audio channels
    pub fn with_audio_channels(mut self, channels: u32) -> Self {
        self.audio_channels = Some(channels);
        self
    }

    /// Set the declared size
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the direct URL
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Check if the stream carries audio
    pub fn has_audio(&self) -> bool {
        self.audio_channels.unwrap_or(0) > 0
    }

    /// Container name taken from the MIME type, e.g. `mp4` for `video/mp4; codecs="avc1"`
    pub fn container(&self) -> &str {
        let essence = self.mime_type.split(';').next().unwrap_or_default();
        essence
            .split_once('/')
            .map(|(_, subtype)| subtype.trim())
            .unwrap_or("unknown")
    }
}
