// Downloader module - everything between the interactive loop and yt-dlp

pub mod diagnostics;
pub mod errors;
pub mod formats;
pub mod models;
pub mod options;
pub mod orchestrator;
pub mod progress;
pub mod tools;
pub mod traits;
pub mod utils;
pub mod ytdlp;

pub use errors::DownloadError;
pub use models::{
    DispatchOutcome, DownloadRequest, FormatDescriptor, MediaSummary, ProgressEvent, Selection,
};
pub use options::DownloadOptions;
pub use orchestrator::Downloader;
pub use tools::{ToolCommand, ToolManager};
pub use traits::{Extractor, ProgressSink};
pub use ytdlp::YtDlp;
