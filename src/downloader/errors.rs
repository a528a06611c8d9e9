// Error types for the yt-dlp front-end

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp (binary or python module) not found in system
    #[error("yt-dlp not found: {0}")]
    ToolNotFound(String),

    /// The child process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A metadata probe did not finish within the configured bound
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// Network timeout while talking to the site
    #[error("network timeout: {0}")]
    NetworkTimeout(String),

    /// The site refused the request (429, bot detection, etc.)
    #[error("the site blocked the request: {0}")]
    Blocked(String),

    /// URL rejected by yt-dlp
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse yt-dlp JSON output
    #[error("could not parse yt-dlp output: {0}")]
    Parse(String),

    /// yt-dlp exited unsuccessfully
    #[error("{0}")]
    Failed(String),

    /// Reading from or waiting on the yt-dlp child failed
    #[error("lost contact with yt-dlp: {0}")]
    Pipe(#[source] io::Error),

    /// Terminal I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DownloadError {
    /// Build an error from the stderr of a failed yt-dlp run.
    pub fn from_stderr(stderr: &str) -> Self {
        Self::from(summarize_stderr(stderr))
    }
}

impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout(s);
        }

        if lower.contains("http error 429")
            || lower.contains("too many requests")
            || lower.contains("confirm you're not a bot")
            || lower.contains("confirm you are not a bot")
        {
            return Self::Blocked(s);
        }

        if lower.contains("command not found") || lower.contains("no module named yt_dlp") {
            return Self::ToolNotFound(s);
        }

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(s);
        }

        if lower.contains("invalid json") {
            return Self::Parse(s);
        }

        Self::Failed(s)
    }
}

/// Reduce yt-dlp stderr to the lines worth showing to a user.
///
/// Keeps the `ERROR:` lines; without any, falls back to the last non-empty line.
pub fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("yt-dlp exited with an error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_keeps_error_lines() {
        let stderr = "[youtube] abc: Downloading webpage\n\
                      WARNING: something minor\n\
                      ERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(
            summarize_stderr(stderr),
            "ERROR: [youtube] abc: Video unavailable"
        );
    }

    #[test]
    fn test_summary_falls_back_to_last_line() {
        let stderr = "first\nTraceback follows\n\n  \n";
        assert_eq!(summarize_stderr(stderr), "Traceback follows");
        assert_eq!(summarize_stderr(""), "yt-dlp exited with an error");
    }

    #[test]
    fn test_classification() {
        assert!(matches!(
            DownloadError::from("ERROR: Read timed out.".to_string()),
            DownloadError::NetworkTimeout(_)
        ));
        assert!(matches!(
            DownloadError::from("ERROR: HTTP Error 429: Too Many Requests".to_string()),
            DownloadError::Blocked(_)
        ));
        assert!(matches!(
            DownloadError::from("ERROR: Unsupported URL: https://example.com".to_string()),
            DownloadError::InvalidUrl(_)
        ));
        assert!(matches!(
            DownloadError::from("ERROR: Video unavailable".to_string()),
            DownloadError::Failed(_)
        ));
    }

    #[test]
    fn test_classified_errors_keep_the_message() {
        let timeout = DownloadError::from_stderr("ERROR: [youtube] abc: Read timed out.\n");
        assert_eq!(
            timeout.to_string(),
            "network timeout: ERROR: [youtube] abc: Read timed out."
        );

        let blocked = DownloadError::from_stderr("ERROR: HTTP Error 429: Too Many Requests\n");
        assert_eq!(
            blocked.to_string(),
            "the site blocked the request: ERROR: HTTP Error 429: Too Many Requests"
        );
    }

    #[test]
    fn test_from_stderr_uses_summary() {
        let err = DownloadError::from_stderr("noise\nERROR: Private video\n");
        assert_eq!(err.to_string(), "ERROR: Private video");
    }
}
