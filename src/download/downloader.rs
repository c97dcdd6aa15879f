//! Streaming a response body to disk

use crate::core::progress::ProgressTracker;
use crate::error::DownloadError;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use std::future::Future;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// An open media download
pub struct MediaStream {
    /// Size declared by the server, 0 if unknown
    pub size: u64,
    /// Response body
    pub body: BoxStream<'static, Result<Bytes, reqwest::Error>>,
}

impl MediaStream {
    /// Wrap a response body that is expected to hold `size` bytes
    pub fn from_response(response: reqwest::Response, size: u64) -> Self {
        Self {
            size,
            body: response.bytes_stream().boxed(),
        }
    }
}

/// Run `fut`, giving up with [`DownloadError::Cancelled`] as soon as `cancel` fires
pub async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, DownloadError>
where
    F: Future<Output = Result<T, DownloadError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DownloadError::Cancelled),
        result = fut => result,
    }
}

/// Write every chunk of `stream` to a new file at `path`.
///
/// Each chunk is counted by `tracker` after it was read. The file handle is
/// dropped on every exit path; a transfer that fails halfway leaves the
/// partial file in place. Returns the number of bytes written.
pub async fn save_stream<S, B>(
    mut stream: S,
    path: &Path,
    tracker: &mut ProgressTracker,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut file = File::create(path)
        .await
        .map_err(|source| DownloadError::FileCreate {
            path: path.to_path_buf(),
            source,
        })?;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            next = stream.next() => next,
        };

        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(DownloadError::StreamRead)?;
        let bytes = chunk.as_ref();

        tracker.advance(bytes.len());
        file.write_all(bytes).await.map_err(DownloadError::Write)?;
        debug!("Wrote {} bytes, total: {}", bytes.len(), tracker.downloaded());
    }

    file.flush().await.map_err(DownloadError::Write)?;
    file.sync_all().await.map_err(DownloadError::Write)?;

    info!("Download completed: {} bytes to {}", tracker.downloaded(), path.display());
    Ok(tracker.downloaded())
}
