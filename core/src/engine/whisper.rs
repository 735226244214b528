//! Local whisper.cpp engine.
//!
//! Uses whisper.cpp via whisper-rs. Input media is decoded to 16 kHz mono
//! f32 PCM by ffmpeg before inference.

use super::{Segment, Transcriber, Transcription};
use crate::audio::{self, TARGET_SAMPLE_RATE};
use crate::config::{Config, Device};
use crate::error::{Error, Result};
use crate::models::ModelManager;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

/// Local whisper.cpp transcriber.
///
/// The underlying WhisperContext is leaked intentionally: the model stays
/// loaded for the process lifetime, which avoids self-referential struct
/// patterns while letting the state be reused across every file in a batch.
pub struct WhisperTranscriber {
    state: WhisperState,
    language: String,
}

impl WhisperTranscriber {
    /// Create a transcriber, downloading the model file on first use.
    pub async fn new(config: &Config) -> Result<Self> {
        let models = ModelManager::new()?;
        Self::with_model_manager(config, &models).await
    }

    /// Create a transcriber with a custom model manager.
    pub async fn with_model_manager(config: &Config, models: &ModelManager) -> Result<Self> {
        let model_path = models.ensure_model(config.engine.model).await?;

        info!(
            path = %model_path.display(),
            model = %config.engine.model,
            device = %config.engine.device,
            language = %config.language,
            "loading whisper model"
        );
        if config.engine.device == Device::Cuda || config.engine.device == Device::Mps {
            // Placement is fixed at whisper.cpp build time, not per run.
            warn!(device = %config.engine.device, "device selection requires a matching whisper.cpp build");
        }
        if let Some(compute) = config.engine.compute {
            debug!(compute = %compute, "compute precision is decided by the GGML model file");
        }

        // Route whisper.cpp and GGML logs through tracing
        whisper_rs::install_logging_hooks();

        let model_path = model_path
            .to_str()
            .ok_or_else(|| Error::Engine("model path is not valid UTF-8".into()))?;
        let ctx =
            WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                .map_err(|e| Error::Engine(format!("failed to load whisper model: {e}")))?;

        let ctx_ref: &'static WhisperContext = Box::leak(Box::new(ctx));
        let state = ctx_ref
            .create_state()
            .map_err(|e| Error::Engine(format!("failed to create whisper state: {e}")))?;

        info!("whisper model and state loaded");

        Ok(Self {
            state,
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(&mut self, path: &Path) -> Result<Transcription> {
        let started = Instant::now();

        let samples = audio::extract_samples(path).await?;
        let duration = samples.len() as f64 / f64::from(TARGET_SAMPLE_RATE);
        debug!(
            samples = samples.len(),
            duration_secs = duration,
            "decoded audio for whisper"
        );

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        self.state
            .full(params, &samples)
            .map_err(|e| Error::Engine(format!("whisper inference failed: {e}")))?;

        let num_segments = self.state.full_n_segments();
        let mut segments = Vec::with_capacity(num_segments as usize);
        let mut text = String::new();

        for i in 0..num_segments {
            let Some(segment) = self.state.get_segment(i) else {
                continue;
            };
            let Ok(segment_text) = segment.to_str_lossy() else {
                continue;
            };
            // whisper.cpp reports timestamps in centiseconds
            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;
            text.push_str(&segment_text);
            segments.push(Segment {
                start,
                end,
                text: segment_text.trim().to_string(),
            });
        }

        debug!(
            text_len = text.len(),
            segments = segments.len(),
            "whisper transcription complete"
        );

        Ok(Transcription {
            text: text.trim().to_string(),
            segments,
            language: Some(self.language.clone()),
            duration,
            processing_time: started.elapsed().as_secs_f64(),
        })
    }
}
