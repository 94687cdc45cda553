use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TransubError};
use super::{Translator, common::normalize_language_code};

/// Translator using the Google Translate web endpoint
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Join the translated sentence fragments of a `translate_a/single` reply
    pub fn parse_response(body: &Value) -> Result<String> {
        let sentences = body.get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| TransubError::Translation(format!("Unexpected response shape: {}", body)))?;

        let text: String = sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .collect();

        let text = text.trim();
        if text.is_empty() {
            return Err(TransubError::Translation("Empty translation received".to_string()));
        }

        Ok(text.to_string())
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.endpoint);
        let source = normalize_language_code(source);
        let target = normalize_language_code(target);

        debug!("Sending translation request to: {}", url);

        let response = self.client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TransubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TransubError::Translation(format!(
                "Google Translate error {}: {}", status, error_text
            )));
        }

        let body: Value = response.json().await
            .map_err(|e| TransubError::Translation(format!("Failed to parse response: {}", e)))?;

        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::translate::common::test_support::serve_once;

    #[test]
    fn test_parse_response_joins_sentences() {
        let body = json!([
            [["你好。", "こんにちは。", null, null, 10], ["谢谢", "ありがとう", null, null, 10]],
            null,
            "ja"
        ]);
        assert_eq!(GoogleTranslator::parse_response(&body).unwrap(), "你好。谢谢");
    }

    #[test]
    fn test_parse_response_rejects_empty() {
        assert!(GoogleTranslator::parse_response(&json!([[], null, "ja"])).is_err());
        assert!(GoogleTranslator::parse_response(&json!({"error": "quota"})).is_err());
    }

    #[tokio::test]
    async fn test_translate_request() {
        let (url, server) = serve_once(200, r#"[[["你好","こんにちは",null,null,10]],null,"ja"]"#).await;
        let translator = GoogleTranslator::new(Client::new(), url);

        let translation = translator.translate("こんにちは", "ja", "zh-cn").await.unwrap();
        assert_eq!(translation, "你好");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /translate_a/single?"));
        assert!(request.contains("sl=ja"));
        assert!(request.contains("tl=zh-CN"));
        assert!(request.contains("client=gtx"));
    }

    #[tokio::test]
    async fn test_translate_http_error() {
        let (url, server) = serve_once(429, r#"{"error": "too many requests"}"#).await;
        let translator = GoogleTranslator::new(Client::new(), url);

        let result = translator.translate("こんにちは", "ja", "zh-cn").await;
        assert!(matches!(result, Err(TransubError::Translation(_))));
        server.await.unwrap();
    }
}
