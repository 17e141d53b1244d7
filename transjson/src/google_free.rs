//! Keyless Google Translate endpoint (`client=gtx`)
//!
//! This is the `google2` module: no API key, `sl=auto` supported natively,
//! and a nested-array response of the form
//! `[[["translated","original",...],...],null,"detected-lang",...]`.

use crate::error::{TranslateError, TranslateResult};
use crate::translator::{MachineTranslator, validate_locale};
use async_trait::async_trait;
use serde_json::Value;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct GoogleFreeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleFreeProvider {
    /// The endpoint rejects very long GET query strings
    const MAX_CHARS_PER_STRING: usize = 5_000;

    pub fn new() -> TranslateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                TranslateError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: "https://translate.googleapis.com/translate_a/single".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Concatenate the translated segments of a `translate_a/single` response
fn parse_response(json: &Value) -> TranslateResult<String> {
    let sentences = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TranslateError::TranslationError(
                "Invalid response: missing sentence array".to_string(),
            )
        })?;

    let translated: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();

    Ok(translated)
}

#[async_trait]
impl MachineTranslator for GoogleFreeProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }
        let chars = text.chars().count();
        if chars > Self::MAX_CHARS_PER_STRING {
            return Err(TranslateError::TranslationError(format!(
                "Text of {} characters exceeds maximum length of {} characters",
                chars,
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("client", "gtx"),
                ("sl", source_locale),
                ("tl", target_locale),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| TranslateError::ConfigError(format!("Invalid base URL: {}", e)))?;

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranslateError::TranslationError(format!(
                "Endpoint returned {}: {}",
                status, error_text
            )));
        }

        let json: Value = response.json().await.map_err(|e| {
            TranslateError::TranslationError(format!("Failed to parse response: {}", e))
        })?;

        parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "Google Translate (keyless)"
    }
}
