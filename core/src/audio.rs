//! Audio extraction via ffmpeg.
//!
//! Decodes any supported audio or video container to the 16 kHz mono f32
//! PCM stream whisper.cpp expects. ffmpeg must be on PATH.

use crate::error::{Error, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Sample rate whisper models are trained on.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decode a media file to 16 kHz mono f32 samples.
///
/// Video inputs have their audio track extracted; the video stream is
/// dropped. Returns an engine error when ffmpeg is missing or the file
/// cannot be decoded.
pub async fn extract_samples(path: &Path) -> Result<Vec<f32>> {
    let output = Command::new("ffmpeg")
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(path)
        .arg("-vn")
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg(TARGET_SAMPLE_RATE.to_string())
        .arg("-f")
        .arg("f32le")
        .arg("pipe:1")
        .output()
        .await
        .map_err(|e| Error::Engine(format!("failed to run ffmpeg (is it installed?): {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.lines().last().unwrap_or("unknown error").trim();
        return Err(Error::Engine(format!(
            "ffmpeg failed to decode {}: {detail}",
            path.display()
        )));
    }

    let samples = bytes_to_samples(&output.stdout);
    debug!(
        path = %path.display(),
        samples = samples.len(),
        "extracted audio samples"
    );
    Ok(samples)
}

fn bytes_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_samples_little_endian() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-1.0f32).to_le_bytes());
        bytes.extend_from_slice(&0.0f32.to_le_bytes());

        assert_eq!(bytes_to_samples(&bytes), vec![0.5, -1.0, 0.0]);
    }

    #[test]
    fn test_bytes_to_samples_ignores_trailing_partial_frame() {
        let mut bytes = 1.0f32.to_le_bytes().to_vec();
        bytes.push(0xFF);

        assert_eq!(bytes_to_samples(&bytes), vec![1.0]);
    }

    #[test]
    fn test_bytes_to_samples_empty_input() {
        assert!(bytes_to_samples(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_extract_samples_missing_file_is_engine_error() {
        let err = extract_samples(Path::new("/definitely/not/here.mp3"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "engine");
    }
}
