//! Transcript rendering and file output.
//!
//! Renders a transcription to plain text, SRT subtitles, or a JSON record,
//! and writes the result atomically (temp file then rename) so an
//! interrupted run never leaves a half-written transcript behind.

use crate::config::OutputFormat;
use crate::engine::{Segment, Transcription};
use crate::error::{Error, Result};
use serde::Serialize;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Render a transcription in the requested format.
pub fn render(
    transcription: &Transcription,
    source: &Path,
    engine: &str,
    format: OutputFormat,
    include_timestamps: bool,
) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Txt => Ok(render_txt(transcription, include_timestamps).into_bytes()),
        OutputFormat::Srt => Ok(render_srt(transcription).into_bytes()),
        OutputFormat::Json => render_json(transcription, source, engine),
    }
}

fn render_txt(transcription: &Transcription, include_timestamps: bool) -> String {
    if !include_timestamps || transcription.segments.is_empty() {
        let mut out = transcription.text.clone();
        if !out.is_empty() {
            out.push('\n');
        }
        return out;
    }

    let mut out = String::new();
    for segment in &transcription.segments {
        out.push_str(&format!(
            "[{} - {}] {}\n",
            format_clock_time(segment.start),
            format_clock_time(segment.end),
            segment.text
        ));
    }
    out
}

fn render_srt(transcription: &Transcription) -> String {
    // A transcription without segment timing still gets a valid SRT file:
    // one cue spanning the whole recording.
    let fallback;
    let cues: &[Segment] = if transcription.segments.is_empty() {
        if transcription.text.is_empty() {
            &[]
        } else {
            fallback = [Segment {
                start: 0.0,
                end: transcription.duration,
                text: transcription.text.clone(),
            }];
            &fallback
        }
    } else {
        &transcription.segments
    };

    let mut output = String::new();
    for (i, cue) in cues.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start),
            format_srt_time(cue.end)
        ));
        output.push_str(&cue.text);
        output.push('\n');
    }
    output
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    file: String,
    engine: &'a str,
    language: Option<&'a str>,
    duration: f64,
    processing_time: f64,
    text: &'a str,
    segments: &'a [Segment],
}

fn render_json(transcription: &Transcription, source: &Path, engine: &str) -> Result<Vec<u8>> {
    let record = JsonRecord {
        file: source.display().to_string(),
        engine,
        language: transcription.language.as_deref(),
        duration: transcription.duration,
        processing_time: transcription.processing_time,
        text: &transcription.text,
        segments: &transcription.segments,
    };
    let mut bytes = serde_json::to_vec_pretty(&record).map_err(io::Error::other)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm).
fn format_srt_time(seconds: f64) -> String {
    let ms = (seconds * 1000.0).round().max(0.0) as u64;

    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{hours:02}:{mins:02}:{secs:02},{millis:03}")
}

/// Format seconds as a compact clock time (H:MM:SS) for text output.
fn format_clock_time(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}:{mins:02}:{secs:02}")
}

/// Write output bytes atomically, creating parent directories as needed.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source: io::Error| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).await.map_err(write_err)?;
    fs::rename(&temp_path, path).await.map_err(write_err)?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote output file");
    Ok(())
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
