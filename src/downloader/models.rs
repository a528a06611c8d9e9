// Common data models for the downloader

/// One downloadable stream as reported by the probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Format ID (e.g., "137", "140")
    pub format_id: String,
    /// Container extension (mp4, webm, m4a)
    pub ext: String,
    /// Human label, yt-dlp's `format_note` (e.g., "1080p", "medium")
    pub label: String,
    /// File size in bytes, when the site reports it
    pub filesize: Option<u64>,
    /// yt-dlp's full format string (e.g., "137 - 1920x1080 (1080p)")
    pub format: String,
}

/// Metadata gathered right before a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSummary {
    pub title: String,
    /// Number of entries when the URL is a playlist
    pub entry_count: Option<usize>,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    AudioOnly,
    Format(String),
    Best,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub selection: Selection,
    pub playlist: bool,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, selection: Selection, playlist: bool) -> Self {
        Self {
            url: url.into(),
            selection,
            playlist,
        }
    }
}

/// Progress reported by a running download
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading { downloaded: u64, total: Option<u64> },
    /// One file finished downloading; post-processing may follow
    Finished,
    /// A post-processor step (merge, audio extraction, ...)
    Processing(String),
    /// A playlist entry failed and the rest of the playlist went on without it
    Skipped(String),
}

impl ProgressEvent {
    /// Percentage complete, when the total is known and non-zero
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Downloading {
                downloaded,
                total: Some(total),
            } if *total > 0 => Some(*downloaded as f64 / *total as f64 * 100.0),
            _ => None,
        }
    }
}

/// How a dispatched download ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    /// The user declined the playlist confirmation
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let ev = ProgressEvent::Downloading {
            downloaded: 250,
            total: Some(1000),
        };
        assert_eq!(ev.percent(), Some(25.0));

        let unknown = ProgressEvent::Downloading {
            downloaded: 250,
            total: None,
        };
        assert_eq!(unknown.percent(), None);

        let zero = ProgressEvent::Downloading {
            downloaded: 0,
            total: Some(0),
        };
        assert_eq!(zero.percent(), None);
        assert_eq!(ProgressEvent::Finished.percent(), None);
    }
}
