// Translation architecture
//
// Backends implement `Translator` for one text at a time:
// - Google: Google Translate web endpoint
// - Ollama: local LLM with a JSON translation prompt
//
// `translate_segments` fans a whole transcription out over a backend with a
// bounded number of requests in flight.

pub mod common;
pub mod google;
pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{info, warn};

pub use common::*;
use crate::config::{TranslateConfig, TranslationProvider};
use crate::error::{Result, TransubError};
use crate::transcribe::Segment;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` language
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Outcome counts of a [`translate_segments`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    pub translated: usize,
    pub fallback: usize,
}

/// Translate every segment in place with at most `max_concurrency` requests in flight.
///
/// Requests are admitted strictly in segment order and may complete in any order.
/// Each segment is attempted exactly once; on any failure its translation is set to
/// its original text.
pub async fn translate_segments(
    translator: Arc<dyn Translator>,
    segments: &mut [Segment],
    source_language: &str,
    target_language: &str,
    max_concurrency: usize,
) -> TranslationSummary {
    let total = segments.len();
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    info!("Translating {} segments with {} concurrent tasks", total, max_concurrency.max(1));

    let mut tasks = Vec::with_capacity(total);
    for (idx, segment) in segments.iter().enumerate() {
        // Permits are taken here rather than inside the task so admission follows
        // segment order regardless of which worker polls the task first
        let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
        let translator = Arc::clone(&translator);
        let text = segment.text.clone();
        let source = source_language.to_string();
        let target = target_language.to_string();

        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            let result = translator.translate(&text, &source, &target).await;
            match &result {
                Ok(translation) => info!("[{}/{}] Translated: {} -> {}", idx + 1, total, text, translation),
                Err(e) => warn!("[{}/{}] Translation failed ({}): {}", idx + 1, total, text, e),
            }
            result
        }));
    }

    let mut summary = TranslationSummary::default();
    for (segment, task) in segments.iter_mut().zip(tasks) {
        match task.await {
            Ok(Ok(translation)) => {
                segment.translation = Some(translation);
                summary.translated += 1;
            }
            Ok(Err(_)) => {
                segment.translation = Some(segment.text.clone());
                summary.fallback += 1;
            }
            Err(e) => {
                warn!("Translation task for \"{}\" aborted: {}", segment.text, e);
                segment.translation = Some(segment.text.clone());
                summary.fallback += 1;
            }
        }
    }

    info!("Translation finished: {} translated, {} kept original", summary.translated, summary.fallback);
    summary
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the translator selected by `config.provider`
    pub fn create_translator(config: &TranslateConfig) -> Result<Arc<dyn Translator>> {
        let client = build_client(config)?;

        let translator: Arc<dyn Translator> = match config.provider {
            TranslationProvider::Google => {
                Arc::new(google::GoogleTranslator::new(client, config.endpoint()))
            }
            TranslationProvider::Ollama => {
                Arc::new(ollama::OllamaTranslator::new(client, config.endpoint(), config.model.clone()))
            }
        };

        Ok(translator)
    }
}

fn build_client(config: &TranslateConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("transub/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
        .map_err(|e| TransubError::Translation(format!("Failed to create HTTP client: {}", e)))
}
