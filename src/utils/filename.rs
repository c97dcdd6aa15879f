//! Safe filename generation utilities

use chrono::{DateTime, Utc};

/// Characters removed from titles before they are used as filenames
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum filename stem length, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Strip characters that are invalid in filenames, trim surrounding
/// whitespace and cap the result at [`MAX_TITLE_CHARS`] characters.
///
/// Applying it to an already sanitized title returns the title unchanged.
pub fn sanitize_title(title: &str) -> String {
    let stripped: String = title.chars().filter(|c| !INVALID_CHARS.contains(c)).collect();
    let trimmed = stripped.trim();

    match trimmed.char_indices().nth(MAX_TITLE_CHARS) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Filename for a titled video: `<sanitized-title>.<ext>`
pub fn title_filename(title: &str, extension: &str) -> String {
    let mut stem = sanitize_title(title);
    if stem.is_empty() {
        stem = "video".to_string();
    }
    format!("{}.{}", stem, extension.trim_start_matches('.'))
}

/// Filename for an untitled Instagram download: `instagram_video_<unix-seconds>.mp4`
pub fn timestamp_filename(now: DateTime<Utc>) -> String {
    format!("instagram_video_{}.mp4", now.timestamp())
}
