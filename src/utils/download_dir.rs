//! Download directory provisioning

use crate::error::DownloadError;
use std::path::{Path, PathBuf};
use tokio::fs::DirBuilder;
use tracing::debug;

/// Directory, relative to the home directory, that receives downloads
pub const DOWNLOAD_SUBDIR: &[&str] = &["Downloads", "video-downloader"];

/// Resolve `<home>/Downloads/video-downloader` and make sure it exists
pub async fn provision_download_dir() -> Result<PathBuf, DownloadError> {
    let home = dirs::home_dir().ok_or(DownloadError::NoHomeDirectory)?;
    provision_download_dir_in(&home).await
}

/// Same as [`provision_download_dir`], rooted at an explicit home directory
pub async fn provision_download_dir_in(home: &Path) -> Result<PathBuf, DownloadError> {
    let dir = DOWNLOAD_SUBDIR.iter().fold(home.to_path_buf(), |p, s| p.join(s));
    ensure_dir(&dir).await?;
    Ok(dir)
}

/// Create `dir` and any missing parents. Succeeds if it already exists.
pub async fn ensure_dir(dir: &Path) -> Result<(), DownloadError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder
        .create(dir)
        .await
        .map_err(|source| DownloadError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;

    debug!("Download directory ready: {}", dir.display());
    Ok(())
}
