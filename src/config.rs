// Command-line configuration

use std::path::PathBuf;

use clap::Parser;

use crate::downloader::utils::expand_home;

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory downloaded files are written to
    #[arg(short = 'P', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// yt-dlp output filename template
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_TEMPLATE)]
    pub output_template: String,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "YTDLP_PATH", value_name = "PATH")]
    pub yt_dlp: Option<String>,

    /// Python interpreter used when only the yt_dlp module is installed
    #[arg(long, env = "YTDLP_PYTHON", default_value = "python3")]
    pub python: String,

    /// Proxy URL handed to yt-dlp (e.g., "socks5://127.0.0.1:1080")
    #[arg(long)]
    pub proxy: Option<String>,

    /// Netscape-format cookies file
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Load cookies from a browser profile (e.g., "chrome", "firefox")
    #[arg(long, value_name = "BROWSER")]
    pub cookies_from_browser: Option<String>,

    /// Socket timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub socket_timeout: u32,

    /// Retry count for requests, fragments, file access and extractors
    #[arg(long, default_value_t = 10)]
    pub retries: u32,

    /// Upper bound in seconds for metadata probes
    #[arg(long, default_value_t = 120)]
    pub probe_timeout: u64,

    /// Codec for audio-only downloads
    #[arg(long, default_value = "mp3")]
    pub audio_format: String,

    /// Audio quality for audio-only downloads (kbps)
    #[arg(long, default_value = "192")]
    pub audio_quality: String,

    /// Debug logging, and yt-dlp's own verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings shared by every download in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub output_template: String,
    pub proxy: Option<String>,
    pub cookies: Option<PathBuf>,
    pub cookies_from_browser: Option<String>,
    pub socket_timeout: u32,
    pub retries: u32,
    pub probe_timeout: u64,
    pub audio_format: String,
    pub audio_quality: String,
    pub verbose: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            proxy: None,
            cookies: None,
            cookies_from_browser: None,
            socket_timeout: 30,
            retries: 10,
            probe_timeout: 120,
            audio_format: "mp3".to_string(),
            audio_quality: "192".to_string(),
            verbose: false,
        }
    }
}

impl Cli {
    pub fn settings(&self) -> DownloadSettings {
        DownloadSettings {
            output_dir: expand_home(&self.output_dir),
            output_template: self.output_template.clone(),
            proxy: self.proxy.clone(),
            cookies: self.cookies.as_deref().map(expand_home),
            cookies_from_browser: self.cookies_from_browser.clone(),
            socket_timeout: self.socket_timeout,
            retries: self.retries,
            probe_timeout: self.probe_timeout,
            audio_format: self.audio_format.clone(),
            audio_quality: self.audio_quality.clone(),
            verbose: self.verbose,
        }
    }
}
