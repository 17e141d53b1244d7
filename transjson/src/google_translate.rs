//! Google Cloud Translation API v2 provider
//!
//! # Authentication
//!
//! The provider loads the API key from the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable. Obtain a key from:
//! https://console.cloud.google.com/
//!
//! When the source locale is `auto` the `source` field is omitted and the API
//! detects the language itself.

use crate::error::{TranslateError, TranslateResult};
use crate::translator::{MachineTranslator, is_auto, validate_locale};
use async_trait::async_trait;
use serde_json::json;

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL for Google Translate API
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Maximum characters per string (Google Translate API limit)
    const MAX_CHARS_PER_STRING: usize = 30_000;

    pub fn new(api_key: String) -> TranslateResult<Self> {
        if api_key.trim().is_empty() {
            return Err(TranslateError::ConfigError(
                "API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TranslateError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key,
            client,
            base_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
        })
    }

    /// Create a provider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> TranslateResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            TranslateError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    /// Point the provider at a different endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// POST one text to the API and return its `translatedText`
    async fn request_translation(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        let url = reqwest::Url::parse_with_params(&self.base_url, &[("key", &self.api_key)])
            .map_err(|e| TranslateError::ConfigError(format!("Invalid base URL: {}", e)))?;

        let mut body = json!({
            "q": [text],
            "target": target_locale,
            "format": "text"
        });
        if !is_auto(source_locale) {
            body["source"] = json!(source_locale);
        }

        let response = self.client.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &error_text));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        let translations = json["data"]["translations"].as_array().ok_or_else(|| {
            TranslateError::TranslationError(
                "Invalid API response: missing 'data.translations' array".to_string(),
            )
        })?;

        match translations.as_slice() {
            [only] => only["translatedText"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| {
                    TranslateError::TranslationError(
                        "Invalid API response: missing 'translatedText' field".to_string(),
                    )
                }),
            other => Err(TranslateError::TranslationError(format!(
                "API returned {} translations for 1 text",
                other.len()
            ))),
        }
    }
}

/// Map a non-success status to an error
///
/// Rejected requests and credentials fail the same way on every call, so they
/// are configuration errors. Rate limiting, request timeouts and server
/// errors are transient.
fn classify_status(status: reqwest::StatusCode, body: &str) -> TranslateError {
    match status.as_u16() {
        400 | 401 | 403 | 404 => {
            TranslateError::ConfigError(format!("API client error ({}): {}", status, body))
        }
        408 | 429 => TranslateError::NetworkError(format!("API throttled ({}): {}", status, body)),
        _ => TranslateError::TranslationError(format!("API error ({}): {}", status, body)),
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
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

        self.request_translation(text, source_locale, target_locale)
            .await
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> GoogleTranslateProvider {
        GoogleTranslateProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url(format!("{}/language/translate/v2", server.uri()))
    }

    #[test]
    fn test_new_with_empty_key() {
        match GoogleTranslateProvider::new("   ".to_string()) {
            Err(TranslateError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_debug_masks_key() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("test-key"));
    }

    #[tokio::test]
    async fn test_translate_empty_text_skips_request() {
        let provider = GoogleTranslateProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:1/unreachable");
        assert_eq!(provider.translate("", "en", "fr").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_translate_invalid_locale() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        assert!(provider.translate("hello", "en", "fr#bad").await.is_err());
    }

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let long_text = "x".repeat(GoogleTranslateProvider::MAX_CHARS_PER_STRING + 1);
        match provider.translate(&long_text, "en", "fr").await {
            Err(TranslateError::TranslationError(msg)) => assert!(msg.contains("exceeds maximum")),
            _ => panic!("Expected TranslationError"),
        }
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({"target": "es", "source": "en"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"translations": [{"translatedText": "hola"}]}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(provider.translate("hello", "en", "es").await.unwrap(), "hola");
    }

    #[tokio::test]
    async fn test_auto_source_omits_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"translations": [{"translatedText": "bonjour"}]}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.translate("hello", "auto", "fr").await.unwrap(),
            "bonjour"
        );

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("source").is_none());
        assert_eq!(body["target"], "fr");
    }

    #[tokio::test]
    async fn test_client_error_maps_to_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        match provider.translate("hello", "en", "es").await {
            Err(TranslateError::ConfigError(msg)) => assert!(msg.contains("403")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_translation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(matches!(
            provider.translate("hello", "en", "es").await,
            Err(TranslateError::TranslationError(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        match provider.translate("hello", "en", "es").await {
            Err(TranslateError::TranslationError(msg)) => {
                assert!(msg.contains("data.translations"))
            }
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate Limit Exceeded"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        match provider.translate("hello", "en", "es").await {
            Err(err @ TranslateError::NetworkError(_)) => {
                assert!(err.is_retryable());
                assert!(err.to_string().contains("429"));
            }
            other => panic!("Expected NetworkError, got {:?}", other),
        }
    }

    #[test]
    fn test_status_classification() {
        use reqwest::StatusCode;
        for code in [400, 401, 403] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!classify_status(status, "").is_retryable(), "{}", code);
        }
        for code in [408, 429, 500, 503] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(classify_status(status, "").is_retryable(), "{}", code);
        }
    }

    #[tokio::test]
    async fn test_length_limit_counts_characters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"translations": [{"translatedText": "ok"}]}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        // 3 bytes per character: over the limit in bytes, under it in characters
        let cjk = "字".repeat(GoogleTranslateProvider::MAX_CHARS_PER_STRING);
        assert_eq!(provider.translate(&cjk, "zh-CN", "en").await.unwrap(), "ok");
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_single_translation() {
        if std::env::var("GOOGLE_TRANSLATE_API_KEY").is_err() {
            eprintln!("Skipping: GOOGLE_TRANSLATE_API_KEY not set");
            return;
        }

        let provider = GoogleTranslateProvider::from_env().unwrap();
        let result = provider.translate("Hello", "en", "fr").await.unwrap();
        assert!(!result.is_empty());
    }
}
