//! OpenAI transcription API engine.
//!
//! Uploads the original media bytes as multipart form data and asks for a
//! `verbose_json` response so segments, language, and duration come back.

use super::{Segment, Transcriber, Transcription};
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "whisper-1";
/// The service rejects uploads above 25 MB, so fail fast client-side.
const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Cloud transcription engine.
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl OpenAiTranscriber {
    /// Create an engine from resolved configuration.
    ///
    /// Fails with an authentication error when no credential resolved from
    /// any layer.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.engine.api_key.clone().ok_or_else(|| {
            Error::Auth("no API key configured (set OPENAI_API_KEY or pass --api-key)".into())
        })?;
        Ok(Self::with_base_url(
            api_key,
            config.language.clone(),
            DEFAULT_BASE_URL.to_string(),
        ))
    }

    /// Create an engine against a custom API root, for tests and
    /// compatible proxies.
    pub fn with_base_url(api_key: String, language: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            language,
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn transcribe(&mut self, path: &Path) -> Result<Transcription> {
        let started = Instant::now();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Engine(format!("failed to read {}: {e}", path.display())))?;

        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(Error::Engine(format!(
                "{} is {} bytes, above the {MAX_UPLOAD_BYTES} byte API upload limit",
                path.display(),
                bytes.len()
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for_extension(&extension))
            .map_err(|e| Error::Engine(format!("mime: {e}")))?;

        let form = multipart::Form::new()
            .text("model", MODEL)
            .text("language", self.language.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);

        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!(language = %self.language, "sending audio to transcription API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Engine(format!("transcription request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(Error::Auth(format!("API rejected credential: {status}: {body}")));
            }
            return Err(Error::Engine(format!("API returned {status}: {body}")));
        }

        let parsed: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| Error::Engine(format!("invalid API response: {e}")))?;

        let segments: Vec<Segment> = parsed
            .segments
            .into_iter()
            .map(|s| Segment {
                start: s.start,
                end: s.end,
                text: s.text.trim().to_string(),
            })
            .collect();

        let duration = parsed
            .duration
            .unwrap_or_else(|| segments.last().map(|s| s.end).unwrap_or(0.0));

        info!(
            chars = parsed.text.len(),
            segments = segments.len(),
            "cloud transcription complete"
        );

        Ok(Transcription {
            text: parsed.text.trim().to_string(),
            segments,
            language: parsed.language,
            duration,
            processing_time: started.elapsed().as_secs_f64(),
        })
    }
}

/// `verbose_json` response body. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" | "opus" => "audio/ogg",
        "wma" => "audio/x-ms-wma",
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
