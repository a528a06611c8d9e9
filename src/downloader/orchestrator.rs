// Orchestrator: probe, confirm, download, and the single fallback retry

use std::io::Write;

use crate::config::DownloadSettings;
use crate::console::{Console, LineSource};

use super::errors::DownloadError;
use super::models::{DispatchOutcome, DownloadRequest, FormatDescriptor};
use super::options::DownloadOptions;
use super::progress::ProgressPrinter;
use super::traits::Extractor;

pub struct Downloader {
    extractor: Box<dyn Extractor>,
    settings: DownloadSettings,
}

impl Downloader {
    pub fn new(extractor: Box<dyn Extractor>, settings: DownloadSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    /// Listable formats for `url`. Failures are printed and yield an empty list.
    pub async fn list_formats<L, W>(
        &self,
        console: &mut Console<L, W>,
        url: &str,
    ) -> Result<Vec<FormatDescriptor>, DownloadError>
    where
        L: LineSource,
        W: Write + Send,
    {
        let options = DownloadOptions::base(&self.settings);
        match self.extractor.list_formats(url, &options).await {
            Ok(formats) => {
                tracing::debug!("[Downloader] {} listable formats", formats.len());
                Ok(formats)
            }
            Err(e) => {
                tracing::warn!(
                    "[Downloader] format probe failed with {}: {}",
                    self.extractor.name(),
                    e
                );
                console.say(format!("Error getting formats: {}", e))?;
                Ok(Vec::new())
            }
        }
    }

    /// Run one download request to completion.
    ///
    /// An `Err` means the download failed and no fallback applied or the fallback failed too.
    pub async fn download<L, W>(
        &self,
        console: &mut Console<L, W>,
        request: &DownloadRequest,
    ) -> Result<DispatchOutcome, DownloadError>
    where
        L: LineSource,
        W: Write + Send,
    {
        let options =
            DownloadOptions::for_selection(&self.settings, &request.selection, request.playlist);

        console.say("\nStarting download...")?;
        console.say(format!("URL: {}", request.url))?;

        let outcome = match self.attempt(console, request, &options).await {
            Ok(outcome) => outcome,
            // the terminal itself failed; retrying the download won't help
            Err(DownloadError::Io(e)) => return Err(DownloadError::Io(e)),
            Err(e) => {
                console.say(format!("\nError during download: {}", e))?;

                let Some(fallback) = options.fallback(&request.selection) else {
                    return Err(e);
                };

                tracing::info!(
                    "[Downloader] Retrying {} with format {}",
                    request.url,
                    fallback.format
                );
                console.say("\nTrying alternative format...")?;
                let mut printer = ProgressPrinter::new(console.output());
                self.extractor
                    .download(&request.url, &fallback, &mut printer)
                    .await?;
                DispatchOutcome::Completed
            }
        };

        if outcome == DispatchOutcome::Completed {
            console.say("\nDownload completed successfully!")?;
        }

        Ok(outcome)
    }

    async fn attempt<L, W>(
        &self,
        console: &mut Console<L, W>,
        request: &DownloadRequest,
        options: &DownloadOptions,
    ) -> Result<DispatchOutcome, DownloadError>
    where
        L: LineSource,
        W: Write + Send,
    {
        console.say("\nExtracting information...")?;
        let summary = self.extractor.probe(&request.url, options).await?;

        if request.playlist {
            console.say(format!("\nFound playlist: {}", summary.title))?;
            console.say(format!(
                "Number of videos: {}",
                summary.entry_count.unwrap_or(0)
            ))?;

            let answer = console
                .prompt("Do you want to download the entire playlist? (y/n): ")
                .await?
                .unwrap_or_default();
            if !answer.trim().eq_ignore_ascii_case("y") {
                console.say("Download cancelled.")?;
                return Ok(DispatchOutcome::Cancelled);
            }
        }

        console.say("\nStarting download...")?;
        let mut printer = ProgressPrinter::new(console.output());
        self.extractor
            .download(&request.url, options, &mut printer)
            .await?;

        Ok(DispatchOutcome::Completed)
    }
}
