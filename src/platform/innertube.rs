//! InnerTube API client for YouTube metadata and streams

use crate::core::video_info::{Format, VideoInfo};
use crate::download::MediaStream;
use crate::error::DownloadError;
use crate::platform::client::{declared_size, HttpClientConfig, ANDROID_USER_AGENT};
use crate::utils::url::extract_video_id;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Public InnerTube endpoint
pub const DEFAULT_API_BASE: &str = "https://www.youtube.com";

/// Source of video metadata and media streams
#[async_trait]
pub trait VideoMetadataService: Send + Sync {
    /// Fetch the title and format listing of the video at `url`
    async fn fetch_video(&self, url: &str) -> Result<VideoInfo, DownloadError>;

    /// Open the media stream of `format`
    async fn open_stream(&self, format: &Format) -> Result<MediaStream, DownloadError>;
}

/// InnerTube API client
pub struct InnerTubeClient {
    http: Client,
    api_base: String,
    client_name: String,
    client_version: String,
}

impl InnerTubeClient {
    /// Create a new InnerTube client
    pub fn new(config: &HttpClientConfig) -> Result<Self, DownloadError> {
        let http = config.clone().with_user_agent(ANDROID_USER_AGENT).build()?;
        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            client_name: "ANDROID".to_string(), // ANDROID gives direct URLs
            client_version: "20.10.38".to_string(),
        })
    }

    /// Point the client at a different API host
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Get player response for a video
    pub async fn get_player_response(&self, video_id: &str) -> Result<PlayerResponse, DownloadError> {
        info!("Fetching player response for video ID: {}", video_id);

        let request_body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": self.client_name,
                    "clientVersion": self.client_version,
                    "androidSdkVersion": 30,
                    "osName": "Android",
                    "osVersion": "11",
                    "hl": "en",
                    "gl": "US"
                }
            },
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true
        });

        let url = format!("{}/youtubei/v1/player", self.api_base);
        debug!("Request URL: {}", url);

        let response = self
            .http
            .post(&url)
            .header("X-YouTube-Client-Name", "3")
            .header("X-YouTube-Client-Version", &self.client_version)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DownloadError::MetadataFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Player request failed with status {}", status);
            return Err(DownloadError::MetadataFetch(format!(
                "player request returned {}",
                status
            )));
        }

        let player_response: PlayerResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::MetadataFetch(e.to_string()))?;

        player_response.check_playable()?;
        Ok(player_response)
    }
}

#[async_trait]
impl VideoMetadataService for InnerTubeClient {
    async fn fetch_video(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| DownloadError::MetadataFetch(format!("no video ID in {}", url)))?;

        let player_response = self.get_player_response(&video_id).await?;
        let video_info = player_response.into_video_info(&video_id);
        debug!(
            "Found {} formats for video {}",
            video_info.formats.len(),
            video_id
        );
        Ok(video_info)
    }

    async fn open_stream(&self, format: &Format) -> Result<MediaStream, DownloadError> {
        let url = format.url.as_deref().ok_or_else(|| {
            DownloadError::StreamOpen(format!(
                "format itag={} has no direct URL (signature protected)",
                format.itag
            ))
        })?;

        debug!("Opening stream for itag={}", format.itag);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::StreamOpen(e.to_string()))?
            .error_for_status()
            .map_err(|e| DownloadError::StreamOpen(e.to_string()))?;

        let size = match declared_size(&response) {
            0 => format.size.unwrap_or(0),
            size => size,
        };

        Ok(MediaStream::from_response(response, size))
    }
}

/// Player response from InnerTube API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub video_details: Option<VideoDetails>,
    pub streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub length_seconds: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    pub formats: Option<Vec<FormatData>>,
    pub adaptive_formats: Option<Vec<FormatData>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatData {
    pub itag: u32,
    pub url: Option<String>,
    pub mime_type: String,
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub quality: String,
    pub quality_label: Option<String>,
    pub content_length: Option<String>,
    pub audio_channels: Option<u32>,
}

impl From<&FormatData> for Format {
    fn from(data: &FormatData) -> Self {
        Format {
            itag: data.itag,
            url: data.url.clone(),
            quality: data.quality.clone(),
            quality_label: data.quality_label.clone(),
            mime_type: data.mime_type.clone(),
            bitrate: data.bitrate.unwrap_or(0),
            size: data.content_length.as_ref().and_then(|s| s.parse().ok()),
            audio_channels: data.audio_channels,
        }
    }
}

impl PlayerResponse {
    /// Fail unless the service says the video can be played
    pub fn check_playable(&self) -> Result<(), DownloadError> {
        let Some(status) = &self.playability_status else {
            return Ok(());
        };

        match status.status.as_str() {
            "OK" => Ok(()),
            other => {
                let reason = status.reason.clone().unwrap_or_else(|| other.to_string());
                warn!("Video playability error: {}", reason);
                Err(DownloadError::VideoUnavailable(reason))
            }
        }
    }

    /// Progressive formats first, then adaptive ones, in listing order
    pub fn parse_formats(&self) -> Vec<Format> {
        let Some(streaming_data) = &self.streaming_data else {
            return Vec::new();
        };

        streaming_data
            .formats
            .iter()
            .chain(streaming_data.adaptive_formats.iter())
            .flatten()
            .map(Format::from)
            .collect()
    }

    /// Convert into the video descriptor used by the downloader
    pub fn into_video_info(self, video_id: &str) -> VideoInfo {
        let formats = self.parse_formats();
        let details = self.video_details.unwrap_or_default();

        VideoInfo {
            id: video_id.to_string(),
            title: details.title,
            author: details.author,
            duration: details.length_seconds.parse().unwrap_or(0),
            formats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_json(media_base: &str) -> String {
        serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "videoDetails": {
                "videoId": "abc123",
                "title": "Test: Video?",
                "author": "Tester",
                "lengthSeconds": "42"
            },
            "streamingData": {
                "formats": [
                    {
                        "itag": 18,
                        "url": format!("{}/media/18", media_base),
                        "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
                        "quality": "medium",
                        "qualityLabel": "360p",
                        "contentLength": "1000",
                        "audioChannels": 2
                    },
                    {
                        "itag": 22,
                        "url": format!("{}/media/22", media_base),
                        "mimeType": "video/mp4; codecs=\"avc1.64001F, mp4a.40.2\"",
                        "quality": "hd720",
                        "qualityLabel": "720p",
                        "audioChannels": 2
                    }
                ],
                "adaptiveFormats": [
                    {
                        "itag": 137,
                        "signatureCipher": "s=abc&url=https%3A%2F%2Fexample.com",
                        "mimeType": "video/mp4; codecs=\"avc1.640028\"",
                        "quality": "hd1080",
                        "qualityLabel": "1080p"
                    }
                ]
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_player_response() {
        let response: PlayerResponse = serde_json::from_str(&player_json("http://media")).unwrap();
        let info = response.into_video_info("abc123");

        assert_eq!(info.title, "Test: Video?");
        assert_eq!(info.author, "Tester");
        assert_eq!(info.duration, 42);
        assert_eq!(info.formats.len(), 3);

        let first = &info.formats[0];
        assert_eq!(first.itag, 18);
        assert_eq!(first.quality, "medium");
        assert_eq!(first.quality_label.as_deref(), Some("360p"));
        assert_eq!(first.size, Some(1000));
        assert_eq!(first.container(), "mp4");
        assert!(first.has_audio());

        let adaptive = &info.formats[2];
        assert!(adaptive.url.is_none());
        assert!(!adaptive.has_audio());
    }

    #[test]
    fn test_playability_errors() {
        let response: PlayerResponse = serde_json::from_str(
            r#"{"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age"}}"#,
        )
        .unwrap();

        match response.check_playable() {
            Err(DownloadError::VideoUnavailable(reason)) => assert!(reason.contains("Sign in")),
            other => panic!("unexpected: {:?}", other),
        }

        let response: PlayerResponse = serde_json::from_str("{}").unwrap();
        assert!(response.check_playable().is_ok());
        assert!(response.parse_formats().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_video_from_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/youtubei/v1/player")
            .match_header("x-youtube-client-name", "3")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(player_json(&server.url()))
            .create_async()
            .await;

        let client = InnerTubeClient::new(&HttpClientConfig::default())
            .unwrap()
            .with_api_base(&server.url());
        let info = client
            .fetch_video("https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(info.id, "abc123");
        assert_eq!(info.formats.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_video_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/youtubei/v1/player")
            .with_status(500)
            .create_async()
            .await;

        let client = InnerTubeClient::new(&HttpClientConfig::default())
            .unwrap()
            .with_api_base(&server.url());
        let result = client.fetch_video("https://youtu.be/abc123").await;

        assert!(matches!(result, Err(DownloadError::MetadataFetch(_))));
    }

    #[tokio::test]
    async fn test_fetch_video_without_id() {
        let client = InnerTubeClient::new(&HttpClientConfig::default()).unwrap();
        let result = client.fetch_video("https://www.youtube.com/feed/trending").await;

        assert!(matches!(result, Err(DownloadError::MetadataFetch(_))));
    }

    #[tokio::test]
    async fn test_open_stream_requires_direct_url() {
        let client = InnerTubeClient::new(&HttpClientConfig::default()).unwrap();
        let format = Format::new(137, "hd1080", "video/mp4");

        let result = client.open_stream(&format).await;
        assert!(matches!(result, Err(DownloadError::StreamOpen(_))));
    }

    #[tokio::test]
    async fn test_open_stream_declared_size() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/media/18")
            .with_status(200)
            .with_body(vec![7u8; 64])
            .create_async()
            .await;

        let client = InnerTubeClient::new(&HttpClientConfig::default()).unwrap();
        let format = Format::new(18, "medium", "video/mp4")
            .with_url(&format!("{}/media/18", server.url()))
            .with_audio_channels(2);

        let stream = client.open_stream(&format).await.unwrap();
        assert_eq!(stream.size, 64);
    }
}
