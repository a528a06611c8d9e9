// Extractor trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{FormatDescriptor, MediaSummary, ProgressEvent};
use super::options::DownloadOptions;

/// Trait for the tool that does the actual extraction and download
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// List the listable formats of a single video
    async fn list_formats(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<Vec<FormatDescriptor>, DownloadError>;

    /// Metadata-only run ahead of a download
    async fn probe(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<MediaSummary, DownloadError>;

    /// Download with progress updates
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<(), DownloadError>;
}

/// Receives progress while a download runs
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}
