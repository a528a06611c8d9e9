// Download configuration and its rendering to yt-dlp arguments

use std::path::PathBuf;

use crate::config::DownloadSettings;

use super::models::Selection;
use super::progress::PROGRESS_TEMPLATE;

pub const BEST: &str = "best";
pub const BEST_AUDIO: &str = "bestaudio/best";
/// Selector tried once when the best-quality download fails
pub const FALLBACK_FORMAT: &str = "bestvideo+bestaudio/best";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Audio post-processing (yt-dlp's FFmpegExtractAudio)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: String,
    pub quality: String,
}

/// Everything handed to yt-dlp for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub output_template: String,
    pub output_dir: PathBuf,
    pub format: String,
    pub extract_audio: Option<AudioExtraction>,
    pub playlist: bool,
    pub quiet: bool,
    pub no_warnings: bool,
    pub no_check_certificate: bool,
    pub ignore_errors: bool,
    pub verbose: bool,
    pub socket_timeout: u32,
    pub retries: u32,
    pub fragment_retries: u32,
    pub file_access_retries: u32,
    pub extractor_retries: u32,
    pub http_headers: Vec<(String, String)>,
    pub proxy: Option<String>,
    pub cookies: Option<PathBuf>,
    pub cookies_from_browser: Option<String>,
}

impl DownloadOptions {
    /// Base options shared by every download, with the `best` selector
    pub fn base(settings: &DownloadSettings) -> Self {
        Self {
            output_template: settings.output_template.clone(),
            output_dir: settings.output_dir.clone(),
            format: BEST.to_string(),
            extract_audio: None,
            playlist: false,
            quiet: false,
            no_warnings: true,
            no_check_certificate: true,
            ignore_errors: true,
            verbose: settings.verbose,
            socket_timeout: settings.socket_timeout,
            retries: settings.retries,
            fragment_retries: settings.retries,
            file_access_retries: settings.retries,
            extractor_retries: settings.retries,
            http_headers: default_headers(),
            proxy: settings.proxy.clone(),
            cookies: settings.cookies.clone(),
            cookies_from_browser: settings.cookies_from_browser.clone(),
        }
    }

    pub fn for_selection(
        settings: &DownloadSettings,
        selection: &Selection,
        playlist: bool,
    ) -> Self {
        let mut options = Self::base(settings);

        match selection {
            Selection::AudioOnly => {
                options.format = BEST_AUDIO.to_string();
                options.extract_audio = Some(AudioExtraction {
                    codec: settings.audio_format.clone(),
                    quality: settings.audio_quality.clone(),
                });
            }
            Selection::Format(id) => options.format = id.clone(),
            Selection::Best => options.format = BEST.to_string(),
        }

        if playlist {
            options.playlist = true;
            options.quiet = true;
        }

        options
    }

    /// Options for the single retry, if this selection has one
    pub fn fallback(&self, selection: &Selection) -> Option<Self> {
        match selection {
            Selection::Best => Some(Self {
                format: FALLBACK_FORMAT.to_string(),
                ..self.clone()
            }),
            _ => None,
        }
    }

    /// Network, auth and header flags common to probes and downloads
    fn connection_args(&self) -> Vec<String> {
        let mut args = vec![
            "--socket-timeout".to_string(),
            self.socket_timeout.to_string(),
            "--retries".to_string(),
            self.retries.to_string(),
            "--extractor-retries".to_string(),
            self.extractor_retries.to_string(),
        ];

        if self.no_check_certificate {
            args.push("--no-check-certificates".to_string());
        }
        if self.no_warnings {
            args.push("--no-warnings".to_string());
        }

        for (name, value) in &self.http_headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        if let Some(path) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().to_string());
        } else if let Some(browser) = &self.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        args
    }

    /// Arguments for a metadata-only run that prints one JSON document
    pub fn probe_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["-J".to_string(), "--skip-download".to_string()];

        if self.playlist {
            args.push("--flat-playlist".to_string());
            args.push("--yes-playlist".to_string());
        } else {
            args.push("--no-playlist".to_string());
        }

        args.extend(self.connection_args());
        args.push(url.to_string());
        args
    }

    /// Arguments for the actual download, with machine-readable progress on stdout
    pub fn download_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            self.output_template.clone(),
            "-P".to_string(),
            self.output_dir.to_string_lossy().to_string(),
            "--newline".to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
            "--fragment-retries".to_string(),
            self.fragment_retries.to_string(),
            "--file-access-retries".to_string(),
            self.file_access_retries.to_string(),
        ];

        if self.playlist {
            args.push("--yes-playlist".to_string());
        }

        if self.quiet {
            // --progress keeps progress lines flowing under --quiet
            args.push("--quiet".to_string());
            args.push("--progress".to_string());
        }

        if self.ignore_errors {
            args.push("--ignore-errors".to_string());
        }

        if self.verbose {
            args.push("--verbose".to_string());
        }

        if let Some(audio) = &self.extract_audio {
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                audio.codec.clone(),
                "--audio-quality".to_string(),
                audio.quality.clone(),
            ]);
        }

        args.extend(self.connection_args());
        args.push(url.to_string());
        args
    }
}

fn default_headers() -> Vec<(String, String)> {
    [
        ("User-Agent", USER_AGENT),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "en-us,en;q=0.5"),
        ("Sec-Fetch-Mode", "navigate"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    }

    #[test]
    fn test_audio_only_options() {
        let settings = DownloadSettings::default();
        let options = DownloadOptions::for_selection(&settings, &Selection::AudioOnly, false);
        let args = options.download_args("https://youtu.be/abc");

        assert_eq!(pair(&args, "-f").as_deref(), Some("bestaudio/best"));
        assert!(args.contains(&"-x".to_string()));
        assert_eq!(pair(&args, "--audio-format").as_deref(), Some("mp3"));
        assert_eq!(pair(&args, "--audio-quality").as_deref(), Some("192"));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[test]
    fn test_explicit_format_and_best() {
        let settings = DownloadSettings::default();

        let chosen =
            DownloadOptions::for_selection(&settings, &Selection::Format("137".into()), false);
        assert_eq!(chosen.format, "137");
        assert!(chosen.extract_audio.is_none());

        let best = DownloadOptions::for_selection(&settings, &Selection::Best, false);
        assert_eq!(best.format, "best");
    }

    #[test]
    fn test_retries_and_timeouts_render() {
        let settings = DownloadSettings::default();
        let args = DownloadOptions::base(&settings).download_args("https://x.test/v");

        assert_eq!(pair(&args, "--socket-timeout").as_deref(), Some("30"));
        assert_eq!(pair(&args, "--retries").as_deref(), Some("10"));
        assert_eq!(pair(&args, "--fragment-retries").as_deref(), Some("10"));
        assert_eq!(pair(&args, "--file-access-retries").as_deref(), Some("10"));
        assert_eq!(pair(&args, "--extractor-retries").as_deref(), Some("10"));
        assert_eq!(pair(&args, "-o").as_deref(), Some("%(title)s.%(ext)s"));
        assert!(args.contains(&"--no-check-certificates".to_string()));
        assert!(args.contains(&"--ignore-errors".to_string()));
        assert!(args.contains(&"--newline".to_string()));
        assert!(!args.contains(&"--verbose".to_string()));
    }

    #[test]
    fn test_headers_render_as_add_header() {
        let args = DownloadOptions::base(&DownloadSettings::default()).probe_args("u");
        let headers: Vec<&String> = args
            .iter()
            .zip(args.iter().skip(1))
            .filter(|(flag, _)| *flag == "--add-header")
            .map(|(_, value)| value)
            .collect();

        assert_eq!(headers.len(), 4);
        assert!(headers.iter().any(|h| h.starts_with("User-Agent:Mozilla/5.0")));
        assert!(headers.iter().any(|h| *h == "Sec-Fetch-Mode:navigate"));
    }

    #[test]
    fn test_playlist_options() {
        let settings = DownloadSettings::default();
        let options = DownloadOptions::for_selection(&settings, &Selection::Best, true);
        assert!(options.quiet);

        let probe = options.probe_args("https://x.test/playlist?list=1");
        assert!(probe.contains(&"--flat-playlist".to_string()));
        assert!(!probe.contains(&"--no-playlist".to_string()));

        let download = options.download_args("https://x.test/playlist?list=1");
        assert!(download.contains(&"--quiet".to_string()));
        assert!(download.contains(&"--progress".to_string()));
        assert!(download.contains(&"--yes-playlist".to_string()));
    }

    #[test]
    fn test_fallback_only_for_best() {
        let settings = DownloadSettings::default();

        let best = DownloadOptions::for_selection(&settings, &Selection::Best, false);
        let retry = best.fallback(&Selection::Best).expect("best has a fallback");
        assert_eq!(retry.format, FALLBACK_FORMAT);
        assert_eq!(retry.retries, best.retries);

        let audio = DownloadOptions::for_selection(&settings, &Selection::AudioOnly, false);
        assert!(audio.fallback(&Selection::AudioOnly).is_none());

        let chosen = Selection::Format("18".into());
        let explicit = DownloadOptions::for_selection(&settings, &chosen, false);
        assert!(explicit.fallback(&chosen).is_none());
    }

    #[test]
    fn test_proxy_and_cookies() {
        let settings = DownloadSettings {
            proxy: Some("socks5://127.0.0.1:1080".into()),
            cookies: Some(PathBuf::from("/tmp/cookies.txt")),
            cookies_from_browser: Some("chrome".into()),
            ..DownloadSettings::default()
        };
        let args = DownloadOptions::base(&settings).download_args("u");

        assert_eq!(pair(&args, "--proxy").as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(pair(&args, "--cookies").as_deref(), Some("/tmp/cookies.txt"));
        // an explicit cookies file wins over the browser
        assert!(!args.contains(&"--cookies-from-browser".to_string()));
    }
}
