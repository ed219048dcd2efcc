//! HTTP layer: axum router exposing the journal analyzer as a JSON API.

mod app;
mod error;
mod routes;

pub use app::{DEFAULT_ORIGINS, create_app, serve};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use stresslens_ai::{AnalyzerConfig, EmotionClassifier, JournalAnalyzer, LabelOrder};
    use stresslens_core::{Emotion, StressMethod};
    use tower::ServiceExt;

    use super::*;

    /// Puts all the weight on fear when the text mentions "panic", joy otherwise.
    struct FixedClassifier(LabelOrder);

    impl EmotionClassifier for FixedClassifier {
        fn labels(&self) -> &LabelOrder {
            &self.0
        }

        fn logits_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let hot = if t.contains("panic") { Emotion::Fear } else { Emotion::Joy };
                    self.0
                        .as_slice()
                        .iter()
                        .map(|&e| if e == hot { 4.0 } else { -1.0 })
                        .collect()
                })
                .collect())
        }
    }

    struct FailingClassifier(LabelOrder);

    impl EmotionClassifier for FailingClassifier {
        fn labels(&self) -> &LabelOrder {
            &self.0
        }

        fn logits_batch(&mut self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            anyhow::bail!("onnx runtime exploded")
        }
    }

    fn app_with(classifier: Box<dyn EmotionClassifier>, config: AnalyzerConfig) -> Router {
        let analyzer = Arc::new(JournalAnalyzer::new(classifier, config));
        let origins: Vec<String> = DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect();
        create_app(analyzer, &origins).unwrap()
    }

    fn app() -> Router {
        app_with(
            Box::new(FixedClassifier(LabelOrder::default())),
            AnalyzerConfig::default(),
        )
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn root_message() {
        let (status, body) = send(app(), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Stress-burnout detector API is running" }));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn health_ignores_model_state() {
        let app = app_with(
            Box::new(FailingClassifier(LabelOrder::default())),
            AnalyzerConfig::default(),
        );
        let (status, body) = send(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn predict_full_response() {
        let req = post_json(r#"{"text": "Lovely morning. Then a panic attack at work!"}"#);
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["primary_emotion"], json!("fear"));
        assert_eq!(body["stress_level"], json!("high"));
        assert!(body["stress_score"].as_f64().unwrap() >= 0.6);
        assert_eq!(
            body["coping_strategy"],
            json!("Put both feet on the ground and feel the support beneath you.")
        );

        let scores = body["scores"].as_object().unwrap();
        let mut keys: Vec<&str> = scores.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["anger", "fear", "joy", "love", "sadness", "surprise"]);
        let total: f64 = scores.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((total - 1.0).abs() < 1e-4, "scores sum to {total}");

        let breakdown = body["sentence_breakdown"].as_array().unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0]["sentence"], json!("Lovely morning."));
        assert_eq!(breakdown[0]["emotion"], json!("joy"));
        assert_eq!(breakdown[0]["stress_level"], json!("low"));
        assert_eq!(breakdown[1]["sentence"], json!("Then a panic attack at work!"));
        assert_eq!(breakdown[1]["emotion"], json!("fear"));
    }

    #[tokio::test]
    async fn predict_table_variant_has_no_score() {
        let app = app_with(
            Box::new(FixedClassifier(LabelOrder::default())),
            AnalyzerConfig {
                stress_method: StressMethod::Table,
                sentence_breakdown: false,
            },
        );
        let (status, body) = send(app, post_json(r#"{"text": "all good"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary_emotion"], json!("joy"));
        assert_eq!(body["stress_level"], json!("low"));
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("stress_score"));
        assert!(!obj.contains_key("sentence_breakdown"));
    }

    #[tokio::test]
    async fn predict_rejects_blank_text() {
        let (status, body) = send(app(), post_json(r#"{"text": "   "}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("empty_text"));
    }

    #[tokio::test]
    async fn predict_rejects_malformed_json() {
        let (status, body) = send(app(), post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("invalid_request"));
    }

    #[tokio::test]
    async fn predict_rejects_missing_text_field() {
        let (status, body) = send(app(), post_json(r#"{"body": "hello"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("invalid_request"));
    }

    #[tokio::test]
    async fn predict_requires_json_content_type() {
        let req = Request::post("/predict")
            .body(Body::from(r#"{"text": "hi"}"#))
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"], json!("invalid_request"));
    }

    #[tokio::test]
    async fn predict_inference_failure_is_500() {
        let app = app_with(
            Box::new(FailingClassifier(LabelOrder::default())),
            AnalyzerConfig::default(),
        );
        let (status, body) = send(app, post_json(r#"{"text": "hello"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("inference_failed"));
        assert_eq!(body["error_description"], json!("failed to analyze text"));
    }

    #[tokio::test]
    async fn cors_preflight_allows_frontend_origin() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/predict")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }

    #[tokio::test]
    async fn cors_ignores_unknown_origin() {
        let req = Request::get("/health")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert!(
            !resp
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[test]
    fn bad_origin_is_a_config_error() {
        let analyzer = Arc::new(JournalAnalyzer::new(
            Box::new(FixedClassifier(LabelOrder::default())),
            AnalyzerConfig::default(),
        ));
        assert!(create_app(analyzer, &["bad\norigin".to_string()]).is_err());
    }
}
