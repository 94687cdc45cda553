// Transcription architecture
//
// The workflow only sees the `Transcriber` trait. Implementations wrap a
// concrete speech-to-text runner and map its output onto `Transcription`.
// - FasterWhisper: faster-whisper command-line front end (whisper-ctranslate2)

pub mod common;
pub mod faster_whisper;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::TranscriberConfig;
use crate::error::Result;

/// Main trait for transcription operations
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Check that the model runner is usable before any audio is processed
    async fn load(&self) -> Result<()>;

    /// Transcribe an audio/video file, draining every segment before returning
    async fn transcribe(&self, input_path: &Path, language: &str) -> Result<Transcription>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Box::new(faster_whisper::FasterWhisperTranscriber::new(config))
    }
}
