//! HTTP client construction

use crate::error::DownloadError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Desktop browser identity; Instagram rejects default client identifiers
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// User agent of the ANDROID InnerTube client
pub const ANDROID_USER_AGENT: &str = "com.google.android.youtube/20.10.38 (Linux; U; Android 11) gzip";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Deadline for establishing a connection
    pub connect_timeout: Duration,
    /// Deadline for a whole request including its body, `None` for no limit
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// Build a client from this configuration
    pub fn build(&self) -> Result<Client, DownloadError> {
        let mut builder = ClientBuilder::new()
            .connect_timeout(self.connect_timeout)
            .gzip(true)
            .brotli(true);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        debug!(
            "Building HTTP client (connect timeout {:?}, timeout {:?})",
            self.connect_timeout, self.timeout
        );
        builder.build().map_err(DownloadError::HttpClient)
    }
}

/// Declared body size of a response, 0 when the server did not send one
pub fn declared_size(response: &reqwest::Response) -> u64 {
    response.content_length().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.timeout.is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_build_client() {
        let config = HttpClientConfig {
            timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        }
        .with_user_agent(BROWSER_USER_AGENT);

        assert_eq!(config.user_agent.as_deref(), Some(BROWSER_USER_AGENT));
        assert!(config.build().is_ok());
    }
}
