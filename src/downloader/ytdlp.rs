// yt-dlp extractor - drives the yt-dlp command line
//
// Probes use `-J` and are bounded by a timeout. Downloads stream stdout line by line
// and turn progress lines into events; stderr is drained on its own task and kept
// for the error message. Stdout is read as raw bytes: titles in a console codepage
// are not valid UTF-8.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use super::errors::{summarize_stderr, DownloadError};
use super::formats::parse_formats;
use super::models::{FormatDescriptor, MediaSummary, ProgressEvent};
use super::options::DownloadOptions;
use super::progress::parse_progress_line;
use super::tools::ToolCommand;
use super::traits::{Extractor, ProgressSink};
use super::utils::run_output_with_timeout;

pub struct YtDlp {
    tool: ToolCommand,
    probe_timeout: u64,
}

impl YtDlp {
    pub fn new(tool: ToolCommand, probe_timeout: u64) -> Self {
        Self {
            tool,
            probe_timeout,
        }
    }

    async fn run_json(&self, args: Vec<String>) -> Result<serde_json::Value, DownloadError> {
        let args = self.tool.args(args);
        tracing::debug!("[yt-dlp] {} {}", self.tool.program, args.join(" "));

        let output = run_output_with_timeout(&self.tool.program, args, self.probe_timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("[yt-dlp] probe failed: {}", stderr);
            return Err(DownloadError::from_stderr(&stderr));
        }

        parse_json(&output.stdout)
    }
}

fn parse_json(stdout: &[u8]) -> Result<serde_json::Value, DownloadError> {
    let json_str = String::from_utf8_lossy(stdout);
    serde_json::from_str(&json_str)
        .map_err(|e| DownloadError::Parse(format!("Invalid JSON: {}", e)))
}

/// Title and entry count from a probe response
pub fn parse_summary(json: &serde_json::Value) -> MediaSummary {
    let entry_count = json["entries"]
        .as_array()
        .map(|entries| entries.len())
        .or_else(|| json["playlist_count"].as_u64().map(|n| n as usize));

    MediaSummary {
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        entry_count,
    }
}

#[async_trait]
impl Extractor for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn list_formats(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<Vec<FormatDescriptor>, DownloadError> {
        let single = DownloadOptions {
            playlist: false,
            ..options.clone()
        };
        let json = self.run_json(single.probe_args(url)).await?;
        parse_formats(&json)
    }

    async fn probe(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<MediaSummary, DownloadError> {
        let json = self.run_json(options.probe_args(url)).await?;
        Ok(parse_summary(&json))
    }

    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<(), DownloadError> {
        let args = self.tool.args(options.download_args(url));
        tracing::info!("[yt-dlp] Starting download: format={}", options.format);
        tracing::debug!("[yt-dlp] {} {}", self.tool.program, args.join(" "));

        let mut child = TokioCommand::new(&self.tool.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloadError::Spawn {
                program: self.tool.program.clone(),
                source: e,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Failed("Failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Failed("Failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).to_string()
        });

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut finished = 0usize;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(DownloadError::Pipe)?;
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(&['\r', '\n'][..]);
            match parse_progress_line(line) {
                Some(event) => {
                    if event == ProgressEvent::Finished {
                        finished += 1;
                    }
                    progress.on_progress(event);
                }
                None => tracing::debug!("[yt-dlp] {}", line),
            }
        }

        let status = child.wait().await.map_err(DownloadError::Pipe)?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if status.success() {
            tracing::info!("[yt-dlp] Download finished");
            return Ok(());
        }

        // With --ignore-errors yt-dlp still exits 1 when any playlist entry failed
        if options.playlist && options.ignore_errors && finished > 0 {
            let skipped = summarize_stderr(&stderr_output);
            tracing::warn!(
                "[yt-dlp] Playlist finished with {} file(s); skipped: {}",
                finished,
                skipped
            );
            for reason in skipped.lines() {
                progress.on_progress(ProgressEvent::Skipped(reason.to_string()));
            }
            return Ok(());
        }

        tracing::warn!("[yt-dlp] exited with {}: {}", status, stderr_output.trim());
        Err(DownloadError::from_stderr(&stderr_output))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::*;
    use crate::config::DownloadSettings;
    use crate::downloader::models::Selection;
    use serde_json::json;

    /// A yt-dlp stand-in: `sh -c <script>` with the yt-dlp arguments as `$@`
    pub(crate) fn scripted(script: &str) -> YtDlp {
        let tool = ToolCommand {
            program: "sh".to_string(),
            prefix_args: vec!["-c".to_string(), script.to_string(), "yt-dlp".to_string()],
        };
        YtDlp::new(tool, 10)
    }

    pub(crate) fn pid_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ytdl-{}-{}.pid", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    pub(crate) async fn wait_for_pid(path: &Path) -> u32 {
        loop {
            if let Ok(text) = tokio::fs::read_to_string(path).await {
                if let Ok(pid) = text.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// True once `pid` has exited (reaped or zombie)
    pub(crate) async fn process_gone(pid: u32) -> bool {
        for _ in 0..100 {
            match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
                Err(_) => return true,
                Ok(stat) => {
                    let state = stat.rsplit(')').next().and_then(|s| s.trim_start().chars().next());
                    if state == Some('Z') {
                        return true;
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[derive(Default)]
    struct Recorded(Vec<ProgressEvent>);

    impl ProgressSink for Recorded {
        fn on_progress(&mut self, event: ProgressEvent) {
            self.0.push(event);
        }
    }

    fn options(selection: Selection, playlist: bool) -> DownloadOptions {
        DownloadOptions::for_selection(&DownloadSettings::default(), &selection, playlist)
    }

    #[test]
    fn test_summary_of_video() {
        let summary = parse_summary(&json!({ "title": "A clip", "formats": [] }));
        assert_eq!(summary.title, "A clip");
        assert_eq!(summary.entry_count, None);
    }

    #[test]
    fn test_summary_of_flat_playlist() {
        let summary = parse_summary(&json!({
            "_type": "playlist",
            "title": "Mix",
            "entries": [ { "url": "a" }, { "url": "b" }, { "url": "c" } ]
        }));
        assert_eq!(summary.title, "Mix");
        assert_eq!(summary.entry_count, Some(3));

        let counted = parse_summary(&json!({ "playlist_count": 7 }));
        assert_eq!(counted.title, "Unknown");
        assert_eq!(counted.entry_count, Some(7));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_json(b"not json"), Err(DownloadError::Parse(_))));
        assert!(parse_json(b"{\"title\": \"x\"}").is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_streams_progress() {
        let ytdlp = scripted(
            "echo '[youtube] abc: Downloading webpage'; \
             echo '[progress] downloading 50 100 NA'; \
             echo '[progress] finished 100 100 NA'; \
             echo 'WARNING: noise' 1>&2",
        );
        let mut events = Recorded::default();

        ytdlp
            .download("https://x.test/v", &options(Selection::Best, false), &mut events)
            .await
            .unwrap();

        assert_eq!(
            events.0,
            vec![
                ProgressEvent::Downloading {
                    downloaded: 50,
                    total: Some(100),
                },
                ProgressEvent::Finished,
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_tolerates_non_utf8_output() {
        let ytdlp = scripted(
            "printf '[download] Destination: Caf\\351.mp4\\n'; \
             printf '[progress] downloading 10 20 NA\\n'; \
             printf '[progress] finished 20 20 NA\\n'",
        );
        let mut events = Recorded::default();

        ytdlp
            .download("https://x.test/v", &options(Selection::AudioOnly, false), &mut events)
            .await
            .unwrap();

        assert_eq!(events.0.len(), 2);
        assert_eq!(events.0[1], ProgressEvent::Finished);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_failure_reports_stderr() {
        let ytdlp = scripted(
            "echo 'WARNING: retrying' 1>&2; \
             echo 'ERROR: [youtube] abc: Private video' 1>&2; \
             exit 1",
        );
        let mut events = Recorded::default();

        let err = ytdlp
            .download("https://x.test/v", &options(Selection::Best, false), &mut events)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Failed(_)));
        assert_eq!(err.to_string(), "ERROR: [youtube] abc: Private video");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_playlist_with_failed_entry_still_succeeds() {
        let playlist = "https://x.test/playlist?list=PL1";
        let script = "echo '[progress] finished 1 1 NA'; \
                      echo '[progress] finished 1 1 NA'; \
                      echo 'ERROR: [youtube] zzz: Private video' 1>&2; \
                      exit 1";
        let mut events = Recorded::default();

        scripted(script)
            .download(playlist, &options(Selection::Best, true), &mut events)
            .await
            .unwrap();

        assert_eq!(
            events.0.last(),
            Some(&ProgressEvent::Skipped("ERROR: [youtube] zzz: Private video".to_string()))
        );

        // a single video, or a playlist where nothing finished, still fails
        let mut events = Recorded::default();
        let single = scripted(script)
            .download("https://x.test/v", &options(Selection::Best, false), &mut events)
            .await;
        assert!(single.is_err());

        let mut events = Recorded::default();
        let nothing = scripted("echo 'ERROR: [youtube] PL1: Playlist does not exist' 1>&2; exit 1")
            .download(playlist, &options(Selection::Best, true), &mut events)
            .await;
        assert!(nothing.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_and_list_formats() {
        let ytdlp = scripted(
            r#"case " $* " in
                 *" --flat-playlist "*) echo '{"title":"Mix","entries":[{},{}]}' ;;
                 *) echo '{"title":"Clip","formats":[{"format_id":"18","ext":"mp4","format_note":"360p"}]}' ;;
               esac"#,
        );

        let summary = ytdlp
            .probe("https://x.test/playlist?list=PL1", &options(Selection::Best, true))
            .await
            .unwrap();
        assert_eq!(summary.title, "Mix");
        assert_eq!(summary.entry_count, Some(2));

        // listing always probes the single video, even for a playlist URL
        let formats = ytdlp
            .list_formats("https://x.test/v&list=PL1", &options(Selection::Best, true))
            .await
            .unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].format_id, "18");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropped_download_kills_the_child() {
        let pid_path = pid_file("drop");
        let ytdlp = scripted(&format!("echo $$ > '{}'; exec sleep 30", pid_path.display()));
        let opts = options(Selection::Best, false);
        let mut events = Recorded::default();

        let pid = tokio::select! {
            result = ytdlp.download("https://x.test/v", &opts, &mut events) => {
                panic!("download ended early: {:?}", result)
            }
            pid = wait_for_pid(&pid_path) => pid,
        };

        assert!(process_gone(pid).await, "yt-dlp child {} still running", pid);
        let _ = std::fs::remove_file(&pid_path);
    }
}
