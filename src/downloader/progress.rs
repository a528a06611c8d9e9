// Progress parsing and printing
//
// yt-dlp runs with `--newline` and PROGRESS_TEMPLATE, so every progress hook call
// becomes one stdout line:
//   [progress] downloading 1048576 10485760 NA
// The classic human-readable line is recognised as well, for builds that ignore
// the template:
//   [download]  12.5% of ~ 310.04MiB at  374.36KiB/s ETA 11:59 (frag 56/454)

use std::io::Write;

use regex::Regex;

use super::models::ProgressEvent;
use super::traits::ProgressSink;

pub const PROGRESS_TEMPLATE: &str = "download:[progress] %(progress.status)s %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s";

lazy_static::lazy_static! {
    static ref TEMPLATE_RE: Regex = Regex::new(
        r"^\[progress\]\s+(\w+)\s+(\S+)\s+(\S+)\s+(\S+)"
    ).unwrap();
    static ref CLASSIC_RE: Regex = Regex::new(
        r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*)\s*(\w+)\s+at"
    ).unwrap();
    static ref POSTPROCESS_RE: Regex = Regex::new(
        r"^\[(Merger|ExtractAudio|VideoConvertor|VideoRemuxer|FixupM3u8|FixupM4a|FixupStretched|EmbedThumbnail|Metadata)\]\s+(.+)"
    ).unwrap();
    static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
}

/// Parse one stdout line from yt-dlp into a progress event
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();

    if let Some(caps) = TEMPLATE_RE.captures(line) {
        let downloaded = parse_count(caps.get(2)?.as_str());
        let total = parse_count(caps.get(3)?.as_str())
            .or_else(|| parse_count(caps.get(4).map_or("NA", |m| m.as_str())));

        return match caps.get(1)?.as_str() {
            "downloading" => Some(ProgressEvent::Downloading {
                downloaded: downloaded.unwrap_or(0),
                total,
            }),
            "finished" => Some(ProgressEvent::Finished),
            // "error" is surfaced through the exit status
            _ => None,
        };
    }

    if let Some(caps) = CLASSIC_RE.captures(line) {
        let percent: f64 = caps.get(1)?.as_str().parse().ok()?;
        let amount: f64 = caps.get(2)?.as_str().parse().ok()?;
        let total = size_to_bytes(amount, caps.get(3)?.as_str())?;
        let downloaded = (total as f64 * percent / 100.0).round() as u64;
        return Some(ProgressEvent::Downloading {
            downloaded,
            total: Some(total),
        });
    }

    if let Some(caps) = POSTPROCESS_RE.captures(line) {
        let step = caps.get(1).map_or("", |m| m.as_str());
        let detail = caps.get(2).map_or("", |m| m.as_str());
        return Some(ProgressEvent::Processing(format!("{}: {}", step, detail)));
    }

    if ALREADY_RE.is_match(line) {
        return Some(ProgressEvent::Processing("file already downloaded".to_string()));
    }

    None
}

/// yt-dlp prints "NA" for unknown fields; estimates may be floats
fn parse_count(field: &str) -> Option<u64> {
    let value: f64 = field.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value.round() as u64)
    } else {
        None
    }
}

fn size_to_bytes(amount: f64, unit: &str) -> Option<u64> {
    let factor: f64 = match unit {
        "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" | "kB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        _ => return None,
    };
    Some((amount * factor).round() as u64)
}

/// Human-readable size for format listings
pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => {
            let mb = b as f64 / 1_048_576.0;
            if mb >= 1024.0 {
                format!("{:.1} GB", mb / 1024.0)
            } else if mb >= 1.0 {
                format!("{:.0} MB", mb)
            } else {
                format!("{:.0} KB", b as f64 / 1024.0)
            }
        }
        None => "Unknown".to_string(),
    }
}

/// Prints progress the way a terminal user expects: one rewritten percentage line
pub struct ProgressPrinter<'a, W: Write + Send> {
    out: &'a mut W,
}

impl<'a, W: Write + Send> ProgressPrinter<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> ProgressSink for ProgressPrinter<'_, W> {
    fn on_progress(&mut self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Downloading { .. } => {
                if let Some(percent) = event.percent() {
                    let _ = write!(self.out, "\rDownloading: {:.1}%", percent);
                    let _ = self.out.flush();
                }
            }
            ProgressEvent::Finished => {
                let _ = writeln!(self.out, "\nProcessing...");
                let _ = self.out.flush();
            }
            ProgressEvent::Processing(step) => {
                tracing::debug!("[yt-dlp] {}", step);
            }
            ProgressEvent::Skipped(reason) => {
                let _ = writeln!(self.out, "\nSkipped: {}", reason);
                let _ = self.out.flush();
            }
        }
    }
}
