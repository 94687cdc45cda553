use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TransubError};
use super::{Translator, common::{clean_translation_response, language_code_to_name}};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Translator using a local LLM served by Ollama
pub struct OllamaTranslator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaTranslator {
    pub fn new(client: Client, endpoint: String, model: String) -> Self {
        Self { client, endpoint, model }
    }

    fn build_prompt(text: &str, source: &str, target: &str) -> String {
        let source_name = language_code_to_name(source);
        let target_name = language_code_to_name(target);

        format!(
            "You are a professional subtitle translator.\n\
             \n\
             CRITICAL: Translate the text from {} to {} ONLY. Do not translate to any other language.\n\
             The target language is: {} (language code: {})\n\
             \n\
             Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
             Do not include any explanations, alternatives, or text in other languages.\n\
             \n\
             Text to translate: \"{}\"\n",
            source_name, target_name, target_name, target, target_name, text
        )
    }

    /// Extract the translation from the model's reply
    pub fn parse_reply(raw: &str) -> Result<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TransubError::Translation("Empty translation received".to_string()));
        }

        let text = match serde_json::from_str::<TranslationResult>(raw) {
            Ok(result) => result.text.trim().to_string(),
            Err(_) => clean_translation_response(raw),
        };

        if text.is_empty() {
            return Err(TransubError::Translation("Empty translation received".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: Self::build_prompt(text, source, target),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TransubError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| TransubError::Translation(format!("Failed to parse response: {}", e)))?;

        debug!("Raw Ollama response: {}", generated.response);
        Self::parse_reply(&generated.response)
    }
}
