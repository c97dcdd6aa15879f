//! Progress tracking for downloads

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback invoked with a progress snapshot after each chunk
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Progress information for a download
#[derive(Debug, Clone)]
pub struct Progress {
    /// Total size of the file in bytes, 0 when unknown
    pub total_size: u64,
    /// Number of bytes downloaded
    pub downloaded_size: u64,
    /// Download progress as a percentage (0.0 to 100.0)
    pub percent: f64,
    /// Current download speed in bytes per second
    pub speed: Option<f64>,
    /// Estimated time remaining
    pub eta: Option<Duration>,
    /// Time when download started
    pub start_time: Instant,
}

impl Progress {
    /// Create a new progress tracker
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            downloaded_size: 0,
            percent: 0.0,
            speed: None,
            eta: None,
            start_time: Instant::now(),
        }
    }

    /// Update progress with new downloaded size
    pub fn update(&mut self, downloaded_size: u64) {
        self.downloaded_size = downloaded_size;
        self.percent = if self.has_known_total() {
            (downloaded_size as f64 / self.total_size as f64) * 100.0
        } else {
            0.0
        };

        let elapsed = self.start_time.elapsed();
        if elapsed.as_millis() > 0 {
            let speed = downloaded_size as f64 / elapsed.as_secs_f64();
            self.speed = Some(speed);

            if speed > 0.0 && self.total_size > downloaded_size {
                let remaining_bytes = self.total_size - downloaded_size;
                self.eta = Some(Duration::from_secs((remaining_bytes as f64 / speed) as u64));
            } else {
                self.eta = None;
            }
        }
    }

    /// Whether the server declared a usable size
    pub fn has_known_total(&self) -> bool {
        self.total_size > 0
    }

    /// Check if download is complete
    pub fn is_complete(&self) -> bool {
        self.has_known_total() && self.downloaded_size >= self.total_size
    }

    /// `Progress: 42.00%`, or `None` while the total size is unknown
    pub fn percent_line(&self) -> Option<String> {
        self.has_known_total()
            .then(|| format!("Progress: {:.2}%", self.percent))
    }

    /// Get human-readable speed string
    pub fn speed_string(&self) -> String {
        match self.speed {
            Some(speed) => format_bytes_per_second(speed),
            None => "Unknown".to_string(),
        }
    }
}

/// Byte counter that sits between the network stream and the output file.
///
/// Every chunk that was successfully read is counted. Observers are only
/// notified once a total size is known, so an unknown size never produces a
/// percentage.
pub struct ProgressTracker {
    progress: Progress,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Start tracking a transfer of `total_size` bytes (0 if unknown)
    pub fn new(total_size: u64, callback: Option<ProgressCallback>) -> Self {
        Self {
            progress: Progress::new(total_size),
            callback,
        }
    }

    /// Count `bytes` more bytes and notify the observer
    pub fn advance(&mut self, bytes: usize) {
        let downloaded = self.progress.downloaded_size + bytes as u64;
        self.progress.update(downloaded);

        if !self.progress.has_known_total() {
            return;
        }
        if let Some(callback) = &self.callback {
            callback(&self.progress);
        }
    }

    /// Current snapshot
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Bytes counted so far
    pub fn downloaded(&self) -> u64 {
        self.progress.downloaded_size
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f64 = bytes as f64;
    let exp = (bytes_f64.ln() / THRESHOLD.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f64 / THRESHOLD.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.1} {}", value, UNITS[exp])
    }
}

/// Size in megabytes with two decimals, as shown before a download starts
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Format bytes per second as human-readable string
pub fn format_bytes_per_second(bytes_per_second: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_second as u64))
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}
