//! Instagram page scraping
//!
//! Server-rendered post pages embed their data as
//! `<script type="text/javascript">window._sharedData = {...};</script>`.
//! The blob is decoded against a partial schema holding only the fields on
//! the path to the video URL:
//!
//! `entry_data.PostPage[0].graphql.shortcode_media.video_url`
//!
//! Every field on that path is optional and tolerant of the wrong JSON type,
//! so a missing or malformed step is reported as its own error instead of a
//! generic parse failure. Nodes on the path must be JSON objects; an array in
//! their place counts as missing.

use crate::download::MediaStream;
use crate::error::DownloadError;
use crate::platform::client::{declared_size, HttpClientConfig, BROWSER_USER_AGENT};
use regex::Regex;
use reqwest::Client;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

const SHARED_DATA_PATTERN: &str =
    r#"<script type="text/javascript">window\._sharedData = (.+);</script>"#;

/// Decode a field as `Some(T)` only if it is present and has the expected shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], for struct nodes: anything but a JSON object is `None`.
/// Serde would otherwise fill a struct positionally from an array.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(object_as))
}

fn object_as<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_object() {
        serde_json::from_value(value).ok()
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
pub struct SharedData {
    #[serde(default, deserialize_with = "lenient_object")]
    pub entry_data: Option<EntryData>,
}

#[derive(Debug, Deserialize)]
pub struct EntryData {
    #[serde(rename = "PostPage", default, deserialize_with = "lenient")]
    pub post_page: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    #[serde(default, deserialize_with = "lenient_object")]
    pub graphql: Option<GraphQl>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQl {
    #[serde(default, deserialize_with = "lenient_object")]
    pub shortcode_media: Option<ShortcodeMedia>,
}

#[derive(Debug, Deserialize)]
pub struct ShortcodeMedia {
    #[serde(default, deserialize_with = "lenient")]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub shortcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub owner: Option<Owner>,
}

#[derive(Debug, Deserialize)]
pub struct Owner {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
}

impl SharedData {
    /// Decode the blob text. Only malformed JSON is a parse error; valid JSON
    /// that is not an object has no `entry_data`.
    pub fn parse(blob: &str) -> Result<Self, DownloadError> {
        let value: Value = serde_json::from_str(blob)?;
        Ok(object_as(value).unwrap_or(SharedData { entry_data: None }))
    }

    /// Walk down to the post's media node
    pub fn shortcode_media(self) -> Result<ShortcodeMedia, DownloadError> {
        let entry_data = self.entry_data.ok_or(DownloadError::EntryDataMissing)?;

        let first_post = entry_data
            .post_page
            .and_then(|pages| pages.into_iter().next())
            .ok_or(DownloadError::PostPageMissing)?;

        let post: PostData = object_as(first_post).ok_or(DownloadError::PostDataMissing)?;

        post.graphql
            .ok_or(DownloadError::GraphQlMissing)?
            .shortcode_media
            .ok_or(DownloadError::ShortcodeMediaMissing)
    }
}

/// Return the text captured from the `window._sharedData` script block
pub fn extract_shared_data(html: &str) -> Result<&str, DownloadError> {
    let pattern = Regex::new(SHARED_DATA_PATTERN)?;
    pattern
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .ok_or(DownloadError::SharedDataNotFound)
}

/// Find the direct video URL embedded in a post page
pub fn parse_video_url(html: &str) -> Result<String, DownloadError> {
    let blob = extract_shared_data(html)?;
    let shared = SharedData::parse(blob)?;
    let media = shared.shortcode_media()?;

    if let (Some(shortcode), Some(owner)) = (&media.shortcode, &media.owner) {
        debug!(
            "Post {} by {}",
            shortcode,
            owner.username.as_deref().unwrap_or("unknown")
        );
    }

    media.video_url.ok_or(DownloadError::VideoUrlMissing)
}

/// HTTP side of the Instagram extractor
pub struct InstagramClient {
    /// Page requests, sent with a desktop browser identity
    http: Client,
    /// Video file requests, sent with the configured identity
    media: Client,
}

impl InstagramClient {
    /// Create a client whose page requests identify as a desktop browser
    pub fn new(config: &HttpClientConfig) -> Result<Self, DownloadError> {
        let http = config.clone().with_user_agent(BROWSER_USER_AGENT).build()?;
        let media = config.build()?;
        Ok(Self { http, media })
    }

    /// Fetch the post page body
    pub async fn fetch_page(&self, url: &str) -> Result<String, DownloadError> {
        info!("Fetching Instagram page: {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(DownloadError::Fetch)?;

        response.text().await.map_err(DownloadError::Fetch)
    }

    /// Resolve the direct video URL of the post at `url`
    pub async fn resolve_video_url(&self, url: &str) -> Result<String, DownloadError> {
        let html = self.fetch_page(url).await?;
        let video_url = parse_video_url(&html)?;
        debug!("Resolved video URL: {}", video_url);
        Ok(video_url)
    }

    /// Open the video file itself
    pub async fn open_video(&self, video_url: &str) -> Result<MediaStream, DownloadError> {
        let response = self
            .media
            .get(video_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(DownloadError::VideoFetch)?;

        let size = declared_size(&response);
        Ok(MediaStream::from_response(response, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(blob: &str) -> String {
        format!(
            "<html><head><script type=\"text/javascript\">window._sharedData = {};</script></head></html>",
            blob
        )
    }

    fn expect_err(blob: &str) -> DownloadError {
        parse_video_url(&page(blob)).unwrap_err()
    }

    #[test]
    fn test_parse_video_url() {
        let blob = r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{
            "video_url":"https://cdn.example.com/v.mp4","shortcode":"Cx1","owner":{"username":"someone"}}}}]}}"#
            .replace('\n', "");
        assert_eq!(parse_video_url(&page(&blob)).unwrap(), "https://cdn.example.com/v.mp4");
    }

    #[test]
    fn test_missing_shared_data() {
        let html = "<html><script>window.other = {};</script></html>";
        assert!(matches!(parse_video_url(html), Err(DownloadError::SharedDataNotFound)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(expect_err("{not json"), DownloadError::JsonParse(_)));
        assert!(matches!(expect_err("[1, 2"), DownloadError::JsonParse(_)));
    }

    #[test]
    fn test_valid_json_without_object_has_no_entry_data() {
        for blob in ["null", "42", r#""text""#, "[]", "true"] {
            assert!(
                matches!(expect_err(blob), DownloadError::EntryDataMissing),
                "{}",
                blob
            );
        }
    }

    #[test]
    fn test_each_missing_step_has_its_own_error() {
        assert!(matches!(expect_err(r#"{}"#), DownloadError::EntryDataMissing));
        assert!(matches!(expect_err(r#"{"entry_data":{}}"#), DownloadError::PostPageMissing));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[]}}"#),
            DownloadError::PostPageMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[{}]}}"#),
            DownloadError::GraphQlMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[{"graphql":{}}]}}"#),
            DownloadError::ShortcodeMediaMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{}}}]}}"#),
            DownloadError::VideoUrlMissing
        ));
    }

    #[test]
    fn test_wrong_shapes_map_to_field_errors() {
        assert!(matches!(expect_err(r#"{"entry_data":"x"}"#), DownloadError::EntryDataMissing));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":{"0":{}}}}"#),
            DownloadError::PostPageMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[42]}}"#),
            DownloadError::PostDataMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[{"graphql":"x"}]}}"#),
            DownloadError::GraphQlMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":null}}]}}"#),
            DownloadError::ShortcodeMediaMissing
        ));
        assert!(matches!(
            expect_err(r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{"video_url":5}}}]}}"#),
            DownloadError::VideoUrlMissing
        ));
    }

    #[test]
    fn test_arrays_in_place_of_objects_are_rejected() {
        let cases = [
            (
                r#"[{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{"video_url":"http://x/top.mp4"}}}]}}]"#,
                "top",
            ),
            (
                r#"{"entry_data":[[{"graphql":{"shortcode_media":{"video_url":"http://x/entry.mp4"}}}]]}"#,
                "entry_data",
            ),
            (
                r#"{"entry_data":{"PostPage":[[{"shortcode_media":{"video_url":"http://x/post.mp4"}}]]}}"#,
                "post",
            ),
            (
                r#"{"entry_data":{"PostPage":[{"graphql":[{"video_url":"http://x/graphql.mp4"}]}]}}"#,
                "graphql",
            ),
            (
                r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":["http://x/media.mp4"]}}]}}"#,
                "shortcode_media",
            ),
            (
                r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{"video_url":["http://x/url.mp4"]}}}]}}"#,
                "video_url",
            ),
        ];

        for (blob, step) in cases {
            let err = expect_err(blob);
            let expected = match step {
                "top" | "entry_data" => matches!(err, DownloadError::EntryDataMissing),
                "post" => matches!(err, DownloadError::PostDataMissing),
                "graphql" => matches!(err, DownloadError::GraphQlMissing),
                "shortcode_media" => matches!(err, DownloadError::ShortcodeMediaMissing),
                _ => matches!(err, DownloadError::VideoUrlMissing),
            };
            assert!(expected, "{}: got {:?}", step, err);
        }
    }

    #[test]
    fn test_owner_array_is_ignored() {
        let blob = r#"{"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{"video_url":"http://x/v.mp4","shortcode":"Cx1","owner":["someone"]}}}]}}"#;
        let shared = SharedData::parse(blob).unwrap();
        let media = shared.shortcode_media().unwrap();

        assert!(media.owner.is_none());
        assert_eq!(media.video_url.as_deref(), Some("http://x/v.mp4"));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_browser_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p/Cx1/")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let client = InstagramClient::new(&HttpClientConfig::default()).unwrap();
        let body = client.fetch_page(&format!("{}/p/Cx1/", server.url())).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_page_http_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/p/gone/").with_status(404).create_async().await;

        let client = InstagramClient::new(&HttpClientConfig::default()).unwrap();
        let result = client.fetch_page(&format!("{}/p/gone/", server.url())).await;

        assert!(matches!(result, Err(DownloadError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_open_video_without_browser_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v.mp4")
            .match_header("user-agent", mockito::Matcher::Missing)
            .with_status(200)
            .with_header("content-length", "4")
            .with_body("data")
            .create_async()
            .await;

        let client = InstagramClient::new(&HttpClientConfig::default()).unwrap();
        let stream = client.open_video(&format!("{}/v.mp4", server.url())).await.unwrap();

        mock.assert_async().await;
        assert_eq!(stream.size, 4);
    }

    #[tokio::test]
    async fn test_open_video_http_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/v.mp4").with_status(403).create_async().await;

        let client = InstagramClient::new(&HttpClientConfig::default()).unwrap();
        let result = client.open_video(&format!("{}/v.mp4", server.url())).await;

        assert!(matches!(result, Err(DownloadError::VideoFetch(_))));
    }
}
