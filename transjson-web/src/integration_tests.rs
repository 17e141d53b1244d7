//! Router tests driven through `tower::ServiceExt::oneshot`

#[cfg(test)]
mod tests {
    use crate::{AppState, app};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;
    use transjson::{
        BackendRegistry, MockMode, MockTranslator, Orchestrator, RetryPolicy, TranslatorConfig,
    };

    fn state(mock: &MockTranslator) -> AppState {
        let config = TranslatorConfig::default()
            .with_retry(RetryPolicy::new(2, Duration::from_millis(1)))
            .with_supported_languages(["en", "es", "fr", "xx"])
            .with_default_module("mock");
        let registry = BackendRegistry::new().register("mock", mock.clone());
        AppState::new(Orchestrator::new(config, registry).unwrap())
    }

    async fn post(mock: &MockTranslator, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/translate-multiple")
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        send(mock, request).await
    }

    async fn post_json(mock: &MockTranslator, body: Value) -> (StatusCode, Value) {
        post(mock, Body::from(body.to_string())).await
    }

    async fn send(mock: &MockTranslator, request: Request<Body>) -> (StatusCode, Value) {
        let response = app(state(mock)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_translate_multiple_ok() {
        let mock = MockTranslator::from_pairs(&[("hello", "es", "hola")]);
        let (status, body) = post_json(
            &mock,
            json!({"data": {"greeting": "hello", "count": 3}, "toLanguages": ["es"]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Translations completed successfully.");
        assert_eq!(body["output"]["es"], json!({"greeting": "hola", "count": 3}));
        assert_eq!(body["summary"]["status"], "complete");
        assert_eq!(
            body["summary"]["languages"]["es"]["keys"]["greeting"]["backend"],
            "mock"
        );
    }

    #[tokio::test]
    async fn test_partial_failure_is_multi_status() {
        let mock = MockTranslator::new(MockMode::Suffix).failing_for("xx");
        let (status, body) = post_json(
            &mock,
            json!({"data": {"greeting": "hello"}, "toLanguages": ["es", "xx"]}),
        )
        .await;

        assert_eq!(status, StatusCode::MULTI_STATUS);
        assert_eq!(body["output"]["es"]["greeting"], "hello_es");
        assert!(body["output"].get("xx").is_none());
        assert_eq!(body["summary"]["failedLanguages"], json!(["xx"]));
        assert!(body["message"].as_str().unwrap().contains("xx"));
    }

    #[tokio::test]
    async fn test_total_failure_has_suggestions() {
        let mock = MockTranslator::new(MockMode::Error("service unavailable".into()));
        let (status, body) = post_json(
            &mock,
            json!({"data": {"greeting": "hello"}, "toLanguages": ["es", "fr"]}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("all requested languages"));
        assert_eq!(body["details"], "Failed languages: es, fr");
        assert!(!body["suggestions"].as_array().unwrap().is_empty());
        assert_eq!(body["summary"]["status"], "failed");
    }

    #[tokio::test]
    async fn test_strict_failure_lists_failed_languages() {
        let mock = MockTranslator::from_pairs(&[("bye", "es", "--"), ("bye", "fr", "--")]);
        let (status, body) = post_json(
            &mock,
            json!({
                "data": {"greeting": "hello", "farewell": "bye"},
                "toLanguages": ["es", "fr"],
                "failurePolicy": "strict"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "Failed languages: es, fr");
        assert_eq!(
            body["summary"]["languages"]["es"]["keys"]["greeting"]["status"],
            "translated"
        );
    }

    #[tokio::test]
    async fn test_empty_languages_is_bad_request_without_calls() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let (status, body) =
            post_json(&mock, json!({"data": {"greeting": "hello"}, "toLanguages": []})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("toLanguages"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_bad_request() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let cases = [
            json!({"toLanguages": ["es"]}),
            json!({"data": "hello", "toLanguages": ["es"]}),
            json!({"data": {}, "toLanguages": "es"}),
            json!({"data": {}, "toLanguages": ["klingon"]}),
            json!({"data": {}, "toLanguages": ["es"], "from": "klingon"}),
            json!({"data": {}, "toLanguages": ["es"], "module": "deepl"}),
            json!({"data": {}, "toLanguages": ["es"], "concurrencylimit": 0}),
            json!({"data": {}, "toLanguages": ["es"], "minimumCompleteness": 2}),
        ];

        for case in cases {
            let (status, body) = post_json(&mock, case.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", case);
            assert!(body["error"].is_string(), "{}", case);
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let (status, body) = post(&mock, Body::from("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_health() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&mock, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backends"], json!(["mock"]));
        assert!(body["uptimeSeconds"].is_u64());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let request = Request::builder().uri("/translate").body(Body::empty()).unwrap();
        let (status, body) = send(&mock, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["availableRoutes"],
            json!(["POST /translate-multiple", "GET /health"])
        );
    }

    #[tokio::test]
    async fn test_wrong_method_lists_routes() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let request = Request::builder()
            .method("GET")
            .uri("/translate-multiple")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&mock, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
        assert_eq!(
            body["availableRoutes"],
            json!(["POST /translate-multiple", "GET /health"])
        );
        assert_eq!(mock.call_count(), 0);
    }
}
