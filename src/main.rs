use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use youtube_downloader_lib::config::Cli;
use youtube_downloader_lib::downloader::DownloadError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match youtube_downloader_lib::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(DownloadError::ToolNotFound(hint)) => {
            eprintln!("Error: yt-dlp was not found: {}", hint);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
