//! Transcription engines.
//!
//! This module provides a trait abstraction over the two backends: the
//! local whisper.cpp engine and the OpenAI transcription API. The engine
//! kind is resolved once, at construction, not per call.

use crate::config::{Config, EngineKind};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

mod openai;
#[cfg(feature = "whisper")]
mod whisper;

pub use openai::OpenAiTranscriber;
#[cfg(feature = "whisper")]
pub use whisper::WhisperTranscriber;

/// One time-bounded span of transcribed text.
///
/// `start <= end`, and across a transcription the starts are
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
    pub text: String,
}

/// Successful engine output for one media file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    /// Full transcribed text.
    pub text: String,
    /// Time-aligned segments, ordered by start. May be empty.
    pub segments: Vec<Segment>,
    /// Language the engine transcribed in, if reported.
    pub language: Option<String>,
    /// Media duration in seconds.
    pub duration: f64,
    /// Wall-clock seconds the engine call took.
    pub processing_time: f64,
}

/// A transcription backend.
///
/// Implementations own their backend resources (model state, HTTP client)
/// exclusively; one engine instance serves one sequential run.
#[async_trait]
pub trait Transcriber: Send {
    /// Short backend name used in logs and JSON output.
    fn name(&self) -> &'static str;

    /// Transcribe one media file.
    async fn transcribe(&mut self, path: &Path) -> Result<Transcription>;
}

/// Construct the engine selected by `config.engine.kind`.
///
/// The local engine downloads its model on first use, so construction can
/// take a while. Selecting the whisper engine in a build without the
/// `whisper` feature fails with `UnsupportedEngine`.
pub async fn create_engine(config: &Config) -> Result<Box<dyn Transcriber>> {
    match config.engine.kind {
        EngineKind::Openai => Ok(Box::new(OpenAiTranscriber::new(config)?)),
        #[cfg(feature = "whisper")]
        EngineKind::Whisper => Ok(Box::new(WhisperTranscriber::new(config).await?)),
        #[cfg(not(feature = "whisper"))]
        EngineKind::Whisper => Err(crate::error::Error::UnsupportedEngine(
            "local whisper engine is not compiled in, rebuild with --features whisper".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn create_engine_requires_credential_for_openai() {
        let mut config = Config::default();
        config.engine.kind = EngineKind::Openai;
        config.engine.api_key = None;

        let Err(err) = create_engine(&config).await else {
            panic!("expected a missing credential to fail engine construction");
        };
        assert_eq!(err.kind(), "authentication");
    }

    #[cfg(not(feature = "whisper"))]
    #[tokio::test]
    async fn create_engine_reports_missing_whisper_feature() {
        let config = Config::default();

        let Err(err) = create_engine(&config).await else {
            panic!("expected whisper selection to fail without the feature");
        };
        assert_eq!(err.kind(), "unsupported-engine");
        assert!(err.to_string().contains("whisper"));
    }
}
