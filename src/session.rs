// Interactive loop: URL prompt, download menu, format choice

use std::future::Future;
use std::io::Write;

use crate::console::{Console, LineSource};
use crate::downloader::diagnostics::diagnose_error;
use crate::downloader::formats::{format_rows, pick_format};
use crate::downloader::{DownloadError, DownloadRequest, Downloader, Selection};

const TROUBLESHOOTING_TIPS: [&str; 7] = [
    "1. Make sure you have a stable internet connection",
    "2. Try updating yt-dlp: yt-dlp -U (or pip install --upgrade yt-dlp)",
    "3. Check if the video is available in your region",
    "4. Try a different video URL",
    "5. Make sure you have enough disk space",
    "6. Try running the program as administrator",
    "7. Check if your antivirus is blocking the download",
];

/// What the user typed at the URL prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInput {
    Quit,
    Empty,
    Url(String),
}

impl UrlInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed.eq_ignore_ascii_case("q") {
            return Self::Quit;
        }
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Url(format!("https://{}", trimmed))
        }
    }
}

pub fn is_playlist_url(url: &str) -> bool {
    url.contains("playlist") || url.contains("&list=")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Quality,
    AudioOnly,
    Best,
    Invalid,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => Self::Quality,
            "2" => Self::AudioOnly,
            "3" => Self::Best,
            _ => Self::Invalid,
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Session<L, W> {
    console: Console<L, W>,
    downloader: Downloader,
}

impl<L: LineSource, W: Write + Send> Session<L, W> {
    pub fn new(console: Console<L, W>, downloader: Downloader) -> Self {
        Self {
            console,
            downloader,
        }
    }

    pub fn into_console(self) -> Console<L, W> {
        self.console
    }

    /// Run until the user quits, input ends, or `interrupt` fires.
    ///
    /// Returns an error only when a download failed for good; the error and the
    /// troubleshooting tips have been printed by then.
    pub async fn run<F>(&mut self, interrupt: F) -> Result<(), DownloadError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        self.console.say("YouTube Video Downloader")?;
        self.console.say("=======================")?;

        loop {
            let step = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                flow = self.iteration() => Some(flow),
            };

            match step {
                None => {
                    tracing::info!("[Session] Interrupted");
                    self.console.say("\nDownload cancelled by user")?;
                    return Ok(());
                }
                Some(Ok(Flow::Continue)) => {}
                Some(Ok(Flow::Quit)) => return Ok(()),
                Some(Err(DownloadError::Io(e))) => return Err(DownloadError::Io(e)),
                Some(Err(e)) => {
                    self.report_failure(&e)?;
                    return Err(e);
                }
            }
        }
    }

    async fn iteration(&mut self) -> Result<Flow, DownloadError> {
        let Some(line) = self
            .console
            .prompt("\nEnter YouTube URL (or 'q' to quit): ")
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let url = match UrlInput::parse(&line) {
            UrlInput::Quit => return Ok(Flow::Quit),
            UrlInput::Empty => {
                self.console.say("Please enter a valid URL")?;
                return Ok(Flow::Continue);
            }
            UrlInput::Url(url) => url,
        };
        let playlist = is_playlist_url(&url);

        let audio_label = self.downloader.settings().audio_format.to_uppercase();
        self.console.say("\nDownload Options:")?;
        self.console.say("1. Download video with quality selection")?;
        self.console
            .say(format!("2. Download audio only ({})", audio_label))?;
        self.console.say("3. Download best quality")?;

        let Some(choice) = self.console.prompt("\nEnter your choice (1-3): ").await? else {
            return Ok(Flow::Quit);
        };

        let selection = match MenuChoice::parse(&choice) {
            MenuChoice::Quality => self.choose_format(&url).await?,
            MenuChoice::AudioOnly => Selection::AudioOnly,
            MenuChoice::Best => Selection::Best,
            MenuChoice::Invalid => {
                self.console.say("Invalid choice. Downloading best quality...")?;
                Selection::Best
            }
        };

        let request = DownloadRequest::new(url, selection, playlist);
        let outcome = self.downloader.download(&mut self.console, &request).await?;
        tracing::debug!("[Session] {} -> {:?}", request.url, outcome);

        Ok(Flow::Continue)
    }

    async fn choose_format(&mut self, url: &str) -> Result<Selection, DownloadError> {
        let formats = self.downloader.list_formats(&mut self.console, url).await?;

        if formats.is_empty() {
            self.console
                .say("Could not get format list. Downloading best quality...")?;
            return Ok(Selection::Best);
        }

        self.console.say("\nAvailable formats:")?;
        for row in format_rows(&formats) {
            self.console.say(row)?;
        }

        let answer = self
            .console
            .prompt("\nEnter format number (or press Enter for best quality): ")
            .await?
            .unwrap_or_default();

        Ok(match pick_format(&answer, &formats) {
            Some(format) => Selection::Format(format.format_id.clone()),
            None => Selection::Best,
        })
    }

    fn report_failure(&mut self, error: &DownloadError) -> Result<(), DownloadError> {
        tracing::error!("[Session] Download failed: {}", error);

        self.console.say(format!("\nError: {}", error))?;
        if let Some(reason) = diagnose_error(&error.to_string()) {
            if reason.is_permanent() {
                self.console.say(format!(
                    "Likely cause: {} (retrying will not help)",
                    reason.description()
                ))?;
            } else {
                self.console
                    .say(format!("Likely cause: {}", reason.description()))?;
            }
        }

        self.console.say("\nTroubleshooting tips:")?;
        for tip in TROUBLESHOOTING_TIPS {
            self.console.say(tip)?;
        }
        Ok(())
    }
}
