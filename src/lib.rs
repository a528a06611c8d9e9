pub mod config;
pub mod console;
pub mod downloader;
pub mod session;

use config::Cli;
use console::Terminal;
use downloader::{DownloadError, Downloader, ToolManager, YtDlp};
use session::Session;

/// Locate yt-dlp and run the interactive session on the terminal
pub async fn run(cli: Cli) -> Result<(), DownloadError> {
    let settings = cli.settings();

    let tool = ToolManager::new(cli.python.clone()).locate(cli.yt_dlp.as_deref())?;
    match tool.version() {
        Some(version) => tracing::info!("[Tools] Using {} ({})", tool.describe(), version),
        None => tracing::warn!("[Tools] {} did not report a version", tool.describe()),
    }

    let extractor = YtDlp::new(tool, settings.probe_timeout);
    let downloader = Downloader::new(Box::new(extractor), settings);
    let mut session = Session::new(Terminal::stdio(), downloader);

    session
        .run(async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No handler could be installed; the default Ctrl-C behavior stays.
                std::future::pending::<()>().await;
            }
        })
        .await
}
