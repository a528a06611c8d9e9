// Format listing: turns a probe response into the numbered menu the user picks from

use serde::Deserialize;

use super::errors::DownloadError;
use super::models::FormatDescriptor;
use super::progress::format_size;

/// One entry of the `formats` array; fields yt-dlp may omit are optional
#[derive(Debug, Deserialize)]
struct RawFormat {
    #[serde(default)]
    format_id: String,
    ext: Option<String>,
    format_note: Option<String>,
    filesize: Option<u64>,
    format: Option<String>,
}

/// Parse yt-dlp `-J` output into listable formats.
///
/// Entries without a label (`format_note`) or extension are dropped, as are entries that
/// don't deserialize; order is preserved.
pub fn parse_formats(json: &serde_json::Value) -> Result<Vec<FormatDescriptor>, DownloadError> {
    let formats_array = json["formats"]
        .as_array()
        .ok_or_else(|| DownloadError::Parse("No formats array in JSON".to_string()))?;

    let formats = formats_array
        .iter()
        .filter_map(|entry| RawFormat::deserialize(entry).ok())
        .filter_map(|raw| {
            let label = raw.format_note.filter(|s| !s.is_empty())?;
            let ext = raw.ext.filter(|s| !s.is_empty())?;

            Some(FormatDescriptor {
                format: raw.format.unwrap_or_else(|| raw.format_id.clone()),
                format_id: raw.format_id,
                ext,
                label,
                filesize: raw.filesize,
            })
        })
        .collect();

    Ok(formats)
}

/// Menu rows, numbered from 1
pub fn format_rows(formats: &[FormatDescriptor]) -> Vec<String> {
    formats
        .iter()
        .enumerate()
        .map(|(i, fmt)| {
            format!(
                "{}. {} ({}) - Size: {}",
                i + 1,
                fmt.label,
                fmt.ext,
                format_size(fmt.filesize)
            )
        })
        .collect()
}

/// Map the user's answer to a listed format.
///
/// Only a plain decimal number within 1..=len selects; everything else means best quality.
pub fn pick_format<'a>(
    input: &str,
    formats: &'a [FormatDescriptor],
) -> Option<&'a FormatDescriptor> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let index: usize = input.parse().ok()?;
    if index == 0 {
        return None;
    }
    formats.get(index - 1)
}
