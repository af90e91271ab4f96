//! Pure renderings of a [`TranscriptionResult`] into the downloadable formats.

use std::fmt::Write;

use super::{OutputFormat, TranscriptionResult};

pub fn to_json(result: &TranscriptionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(result)
}

pub fn from_json(data: &str) -> Result<TranscriptionResult, serde_json::Error> {
    serde_json::from_str(data)
}

pub fn to_text(result: &TranscriptionResult) -> String {
    result.text.clone()
}

/// SubRip cues numbered from 1 in segment order, whatever the segment ids.
pub fn to_srt(result: &TranscriptionResult) -> String {
    if result.segments.is_empty() {
        return result.text.clone();
    }

    let mut out = String::new();
    for (i, segment) in result.segments.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(segment.start, ','),
            format_timestamp(segment.end, ','),
            segment.text
        );
    }
    out
}

pub fn to_vtt(result: &TranscriptionResult) -> String {
    let mut out = String::from("WEBVTT\n\n");
    if result.segments.is_empty() {
        out.push_str(&result.text);
        return out;
    }

    for segment in &result.segments {
        let _ = write!(
            out,
            "{} --> {}\n{}\n\n",
            format_timestamp(segment.start, '.'),
            format_timestamp(segment.end, '.'),
            segment.text
        );
    }
    out
}

pub fn render(result: &TranscriptionResult, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Srt => Ok(to_srt(result)),
        OutputFormat::Txt => Ok(to_text(result)),
        OutputFormat::Vtt => Ok(to_vtt(result)),
    }
}

pub fn srt_timestamp(seconds: f64) -> String {
    format_timestamp(seconds, ',')
}

pub fn vtt_timestamp(seconds: f64) -> String {
    format_timestamp(seconds, '.')
}

/// `HH:MM:SS{sep}mmm`; the hour field grows past two digits instead of wrapping.
fn format_timestamp(seconds: f64, millis_separator: char) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let whole = seconds.floor();
    let total = whole as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    let millis = ((seconds - whole) * 1000.0) as u64;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, secs, millis_separator, millis
    )
}
