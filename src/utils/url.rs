//! URL validation and platform detection

use crate::error::DownloadError;
use std::fmt;
use url::Url;

/// Hosts served by the YouTube extractor
pub const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "youtu.be"];

/// Hosts served by the Instagram extractor
pub const INSTAGRAM_HOSTS: &[&str] = &["instagram.com", "www.instagram.com"];

/// Video platform a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Youtube,
    Instagram,
}

impl Platform {
    /// Platform tag as printed to the user
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
        }
    }

    /// Look up the platform serving `host`
    pub fn from_host(host: &str) -> Option<Platform> {
        if YOUTUBE_HOSTS.contains(&host) {
            Some(Platform::Youtube)
        } else if INSTAGRAM_HOSTS.contains(&host) {
            Some(Platform::Instagram)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a URL to the platform that can download it.
///
/// A string without a scheme has no host, so it is reported as unsupported
/// rather than unparseable.
pub fn validate_url(url: &str) -> Result<Platform, DownloadError> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(DownloadError::UnsupportedPlatform(url.to_string()))
        }
        Err(source) => {
            return Err(DownloadError::InvalidUrl {
                url: url.to_string(),
                source,
            })
        }
    };

    parsed
        .host_str()
        .and_then(Platform::from_host)
        .ok_or_else(|| DownloadError::UnsupportedPlatform(url.to_string()))
}

/// Extract the YouTube video ID from watch, short-link, shorts and embed URLs
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();

    let id = match parsed.host_str()? {
        "youtu.be" => path.trim_start_matches('/').split('/').next()?.to_string(),
        "youtube.com" | "www.youtube.com" => {
            if path.starts_with("/watch") {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.to_string())?
            } else if let Some(rest) = path
                .strip_prefix("/shorts/")
                .or_else(|| path.strip_prefix("/embed/"))
            {
                rest.split('/').next()?.to_string()
            } else {
                return None;
            }
        }
        _ => return None,
    };

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
