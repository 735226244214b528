//! Configuration for parscribe.
//!
//! Handles loading configuration from a TOML file and resolving the final
//! settings from four layers: built-in defaults, the config file,
//! environment variables, and explicit caller overrides (lowest to highest
//! precedence). The resolved `Config` is immutable for the life of a run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variables consulted during resolution.
const ENV_ENGINE: &str = "PARSCRIBE_ENGINE";
const ENV_MODEL: &str = "PARSCRIBE_MODEL";
const ENV_DEVICE: &str = "PARSCRIBE_DEVICE";
const ENV_LANGUAGE: &str = "PARSCRIBE_LANGUAGE";
const ENV_FORMAT: &str = "PARSCRIBE_FORMAT";
const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language code passed to the engine.
    pub language: String,
    /// Apply Persian orthography normalization to engine output.
    pub normalize: bool,
    pub engine: EngineConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Configuration for the transcription engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which backend to use.
    pub kind: EngineKind,
    /// Model size for the local engine.
    pub model: ModelSize,
    /// Computation device for the local engine.
    pub device: Device,
    /// Compute precision for the local engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<Compute>,
    /// Credential for the cloud engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Output rendering and persistence configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Rendered format: "txt", "srt", or "json".
    pub format: OutputFormat,
    /// Directory for output artifacts. Defaults to alongside each input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Include per-segment timestamps in text output.
    pub include_timestamps: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: LogLevel,
    /// Optional log file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Log file rotation: "never", "daily", or "hourly".
    pub rotation: LogRotation,
}

/// Transcription backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Local whisper.cpp engine.
    #[default]
    Whisper,
    /// OpenAI transcription API.
    Openai,
}

/// Whisper model sizes. Multilingual variants only, since Persian needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    #[default]
    Medium,
    LargeV3,
    LargeV3Turbo,
}

/// Computation device for the local engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Device {
    #[default]
    Auto,
    Cpu,
    Cuda,
    Mps,
}

/// Compute precision for the local engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compute {
    Float16,
    Int8,
    Int8Float16,
    Float32,
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Txt,
    Srt,
    Json,
}

impl OutputFormat {
    /// File extension for artifacts in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Srt => "srt",
            OutputFormat::Json => "json",
        }
    }
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a tracing filter directive string for the library crate.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "parscribe_core=error",
            LogLevel::Warn => "parscribe_core=warn",
            LogLevel::Info => "parscribe_core=info",
            LogLevel::Debug => "parscribe_core=debug",
            LogLevel::Trace => "parscribe_core=trace",
        }
    }
}

/// Log file rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Daily,
    Hourly,
}

/// Explicit per-run overrides, highest precedence layer.
///
/// `None` fields fall through to the environment/file/default layers.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub engine: Option<EngineKind>,
    pub model: Option<ModelSize>,
    pub device: Option<Device>,
    pub compute: Option<Compute>,
    pub language: Option<String>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
    pub include_timestamps: Option<bool>,
    pub normalize: Option<bool>,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "fa".to_string(),
            normalize: true,
            engine: EngineConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config directory path.
    /// `~/.config/parscribe/` (or the platform equivalent)
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("parscribe"))
            .ok_or_else(|| Error::Config("could not determine config directory".into()))
    }

    /// Returns the default config file path.
    /// `~/.config/parscribe/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Returns the default data directory path.
    /// `~/.local/share/parscribe/` (or the platform equivalent)
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join("parscribe"))
            .ok_or_else(|| Error::Config("could not determine data directory".into()))
    }

    /// Returns the default models directory path.
    /// `~/.local/share/parscribe/models/`
    pub fn models_dir() -> Result<PathBuf> {
        Self::data_dir().map(|p| p.join("models"))
    }

    /// Load configuration from the default path.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config TOML: {e}")))
    }

    /// Resolve the final configuration from all four layers.
    ///
    /// Precedence, lowest to highest: built-in defaults, the config file
    /// (default location unless `path` is given), environment variables,
    /// then `overrides`.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Apply the environment layer through a lookup function.
    ///
    /// Injected rather than read directly so tests don't mutate process
    /// environment.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = var(ENV_ENGINE) {
            self.engine.kind = v.parse()?;
        }
        if let Some(v) = var(ENV_MODEL) {
            self.engine.model = v.parse()?;
        }
        if let Some(v) = var(ENV_DEVICE) {
            self.engine.device = v.parse()?;
        }
        if let Some(v) = var(ENV_LANGUAGE) {
            self.language = v;
        }
        if let Some(v) = var(ENV_FORMAT) {
            self.output.format = v.parse()?;
        }
        if let Some(v) = var(ENV_API_KEY) {
            self.engine.api_key = Some(v);
        }
        Ok(())
    }

    /// Apply the explicit override layer.
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(v) = overrides.engine {
            self.engine.kind = v;
        }
        if let Some(v) = overrides.model {
            self.engine.model = v;
        }
        if let Some(v) = overrides.device {
            self.engine.device = v;
        }
        if let Some(v) = overrides.compute {
            self.engine.compute = Some(v);
        }
        if let Some(ref v) = overrides.language {
            self.language = v.clone();
        }
        if let Some(v) = overrides.format {
            self.output.format = v;
        }
        if let Some(ref v) = overrides.output_dir {
            self.output.directory = Some(v.clone());
        }
        if let Some(v) = overrides.include_timestamps {
            self.output.include_timestamps = v;
        }
        if let Some(v) = overrides.normalize {
            self.normalize = v;
        }
        if let Some(ref v) = overrides.api_key {
            self.engine.api_key = Some(v.clone());
        }
    }
}

macro_rules! string_enum {
    ($ty:ty, $expected:expr, { $($text:literal => $variant:path),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($variant),)+
                    _ => Err(Error::Config(format!(
                        "unknown value '{s}' (expected one of: {})",
                        $expected
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

string_enum!(EngineKind, "whisper, openai", {
    "whisper" => EngineKind::Whisper,
    "openai" => EngineKind::Openai,
});

string_enum!(ModelSize, "tiny, base, small, medium, large-v3, large-v3-turbo", {
    "tiny" => ModelSize::Tiny,
    "base" => ModelSize::Base,
    "small" => ModelSize::Small,
    "medium" => ModelSize::Medium,
    "large-v3" => ModelSize::LargeV3,
    "large-v3-turbo" => ModelSize::LargeV3Turbo,
});

string_enum!(Device, "auto, cpu, cuda, mps", {
    "auto" => Device::Auto,
    "cpu" => Device::Cpu,
    "cuda" => Device::Cuda,
    "mps" => Device::Mps,
});

string_enum!(Compute, "float16, int8, int8-float16, float32", {
    "float16" => Compute::Float16,
    "int8" => Compute::Int8,
    "int8-float16" => Compute::Int8Float16,
    "float32" => Compute::Float32,
});

string_enum!(OutputFormat, "txt, srt, json", {
    "txt" => OutputFormat::Txt,
    "srt" => OutputFormat::Srt,
    "json" => OutputFormat::Json,
});

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
