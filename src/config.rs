use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use crate::error::{Result, TransubError};

/// Concurrency used when the host's logical core count cannot be detected
pub const FALLBACK_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the faster-whisper command-line front end
    pub binary_path: String,
    /// Model size or path passed to the transcriber
    pub model: String,
    /// Source language code
    pub language: String,
    /// Request word-level timestamps
    pub word_timestamps: bool,
    /// Inference device (cpu, cuda, auto); left to the transcriber when unset
    pub device: Option<String>,
    /// Voice-activity detection parameters
    pub vad: VadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    pub enabled: bool,
    /// Speech probability threshold
    pub threshold: f64,
    /// Padding added around each detected speech chunk
    pub speech_pad_ms: u32,
    /// Maximum speech chunk length; unbounded when unset
    pub max_speech_duration_s: Option<f64>,
    /// Speech chunks shorter than this are dropped
    pub min_speech_duration_ms: u32,
    /// Silence required before a speech chunk is closed
    pub min_silence_duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationProvider {
    /// Google Translate web endpoint
    Google,
    /// Local LLM served by Ollama
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub provider: TranslationProvider,
    /// Service base URL; the provider's default is used when unset
    pub endpoint: Option<String>,
    /// LLM model used by the Ollama provider
    pub model: String,
    /// Target language code
    pub target_language: String,
    /// Maximum translation requests in flight; logical core count when unset
    pub max_concurrency: Option<usize>,
    /// Per-request timeout; no timeout is configured when unset
    pub timeout_secs: Option<u64>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper-ctranslate2".to_string(),
            model: "large-v3".to_string(),
            language: "ja".to_string(),
            word_timestamps: true,
            device: None,
            vad: VadConfig::default(),
        }
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.35,
            speech_pad_ms: 400,
            max_speech_duration_s: None,
            min_speech_duration_ms: 200,
            min_silence_duration_ms: 500,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Google,
            endpoint: None,
            model: "llama3.2:3b".to_string(),
            target_language: "zh-cn".to_string(),
            max_concurrency: None,
            timeout_secs: None,
        }
    }
}

impl TranslateConfig {
    /// Endpoint for the configured provider
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => match self.provider {
                TranslationProvider::Google => "https://translate.googleapis.com".to_string(),
                TranslationProvider::Ollama => "http://localhost:11434".to_string(),
            },
        }
    }

    /// Number of translation requests allowed in flight at once
    pub fn concurrency(&self) -> usize {
        self.max_concurrency
            .filter(|&n| n > 0)
            .unwrap_or_else(default_concurrency)
    }
}

/// Logical core count of the host, or [`FALLBACK_CONCURRENCY`] if unknown
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(FALLBACK_CONCURRENCY)
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TransubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| TransubError::Config(format!("Failed to parse config file: {}", e)))
    }
}
