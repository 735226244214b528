//! Whisper model download and management.
//!
//! Handles automatic downloading of GGML model files on first run.

use crate::config::{Config, ModelSize};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const WHISPER_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Metadata for a downloadable model file.
struct ModelInfo {
    /// Filename to save as.
    filename: &'static str,
    /// Expected file size for validation.
    size_bytes: u64,
}

impl ModelInfo {
    fn url(&self) -> String {
        format!("{}/{}", WHISPER_BASE_URL, self.filename)
    }
}

impl ModelSize {
    fn info(self) -> ModelInfo {
        match self {
            ModelSize::Tiny => ModelInfo {
                filename: "ggml-tiny.bin",
                size_bytes: 77_691_713,
            },
            ModelSize::Base => ModelInfo {
                filename: "ggml-base.bin",
                size_bytes: 147_951_465,
            },
            ModelSize::Small => ModelInfo {
                filename: "ggml-small.bin",
                size_bytes: 487_601_967,
            },
            ModelSize::Medium => ModelInfo {
                filename: "ggml-medium.bin",
                size_bytes: 1_533_774_781,
            },
            ModelSize::LargeV3 => ModelInfo {
                filename: "ggml-large-v3.bin",
                size_bytes: 3_094_623_691,
            },
            ModelSize::LargeV3Turbo => ModelInfo {
                filename: "ggml-large-v3-turbo.bin",
                size_bytes: 1_624_592_891,
            },
        }
    }
}

/// Manages model downloads and storage.
pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    /// Create a new ModelManager using the default models directory.
    ///
    /// Default: `~/.local/share/parscribe/models/`
    pub fn new() -> Result<Self> {
        Ok(Self {
            models_dir: Config::models_dir()?,
        })
    }

    /// Create a ModelManager with a custom models directory.
    pub fn with_dir(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Get the models directory path.
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Ensure a model is available, downloading if necessary.
    ///
    /// Returns the path to the model file. An existing file with the wrong
    /// size is treated as corrupt and downloaded again.
    pub async fn ensure_model(&self, model: ModelSize) -> Result<PathBuf> {
        let info = model.info();
        let model_path = self.models_dir.join(info.filename);

        if model_path.exists() {
            let actual_size = fs::metadata(&model_path).await?.len();
            if actual_size == info.size_bytes {
                debug!(path = %model_path.display(), "model already exists");
                return Ok(model_path);
            }
            warn!(
                model = %model,
                expected = info.size_bytes,
                actual = actual_size,
                "model size mismatch, re-downloading"
            );
            fs::remove_file(&model_path).await?;
        }

        self.download_model(&info, &model_path).await?;
        Ok(model_path)
    }

    /// Download a model file from Hugging Face.
    async fn download_model(&self, info: &ModelInfo, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let url = info.url();
        info!(
            url = %url,
            dest = %dest.display(),
            size = info.size_bytes,
            "downloading model"
        );

        let response = reqwest::get(&url)
            .await
            .map_err(|e| Error::Engine(format!("failed to download model from {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Engine(format!(
                "failed to download model: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Engine(format!("failed to read model download: {e}")))?;

        if bytes.len() as u64 != info.size_bytes {
            return Err(Error::Engine(format!(
                "downloaded model size mismatch: expected {}, got {}",
                info.size_bytes,
                bytes.len()
            )));
        }

        // Write to a temporary file first, then rename (atomic)
        let temp_path = dest.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, dest).await?;

        info!(path = %dest.display(), "model downloaded successfully");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_info_filenames() {
        assert_eq!(ModelSize::Medium.info().filename, "ggml-medium.bin");
        assert_eq!(
            ModelSize::LargeV3Turbo.info().filename,
            "ggml-large-v3-turbo.bin"
        );
    }

    #[test]
    fn test_model_urls_point_at_whisper_cpp_repo() {
        let info = ModelSize::Tiny.info();
        assert_eq!(
            info.url(),
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin"
        );
    }

    #[test]
    fn test_model_manager_custom_dir() {
        let temp = TempDir::new().unwrap();
        let manager = ModelManager::with_dir(temp.path());
        assert_eq!(manager.models_dir(), temp.path());
    }

    #[tokio::test]
    async fn test_existing_model_with_expected_size_is_reused() {
        let temp = TempDir::new().unwrap();
        let manager = ModelManager::with_dir(temp.path());

        // Pretend the tiny model is already on disk with the right size.
        let info = ModelSize::Tiny.info();
        let path = temp.path().join(info.filename);
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(info.size_bytes).unwrap();

        let resolved = manager.ensure_model(ModelSize::Tiny).await.unwrap();
        assert_eq!(resolved, path);
    }
}
