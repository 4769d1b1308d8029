pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::answers::handlers as answers;
use crate::interviews::handlers as interviews;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_audio_bytes = state.config.max_audio_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Mock interviews
        .route(
            "/api/v1/interviews",
            post(interviews::handle_create_interview).get(interviews::handle_list_interviews),
        )
        .route(
            "/api/v1/interviews/:mock_id",
            get(interviews::handle_get_interview),
        )
        // PYQ question sets
        .route(
            "/api/v1/question-sets",
            post(interviews::handle_create_question_set)
                .get(interviews::handle_list_question_sets),
        )
        .route(
            "/api/v1/question-sets/:mock_id",
            get(interviews::handle_get_question_set),
        )
        // Answers and feedback
        .route(
            "/api/v1/interviews/:mock_id/answers",
            post(answers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:mock_id/questions/:index/recording",
            get(answers::handle_recording_status),
        )
        .route(
            "/api/v1/interviews/:mock_id/questions/:index/recording/start",
            post(answers::handle_start_recording),
        )
        .route(
            "/api/v1/interviews/:mock_id/questions/:index/recording/stop",
            post(answers::handle_stop_recording).layer(DefaultBodyLimit::max(max_audio_bytes)),
        )
        .route(
            "/api/v1/interviews/:mock_id/feedback",
            get(answers::handle_feedback),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::USER_EMAIL_HEADER;
    use crate::config::Config;
    use crate::llm_client::{LlmError, Provider, TextProvider, Transcriber};
    use crate::state::testing::{test_config, test_state};

    /// Fails every call; these tests never reach a provider.
    struct OfflineProvider(Provider);

    #[async_trait]
    impl TextProvider for OfflineProvider {
        fn provider(&self) -> Provider {
            self.0
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::MissingApiKey { provider: self.0 })
        }
    }

    #[async_trait]
    impl Transcriber for OfflineProvider {
        async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, LlmError> {
            Err(LlmError::MissingApiKey { provider: self.0 })
        }
    }

    /// Router over a lazy pool that fails fast if a handler queries it.
    fn router_with(config: Config) -> Router {
        build_router(test_state(
            config,
            Arc::new(OfflineProvider(Provider::Gemini)),
            Arc::new(OfflineProvider(Provider::Cohere)),
            Arc::new(OfflineProvider(Provider::Gemini)),
        ))
    }

    fn test_router() -> Router {
        router_with(test_config())
    }

    const BOUNDARY: &str = "interview-audio-boundary";

    fn audio_upload(size: usize) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"answer.webm\"\r\nContent-Type: audio/webm\r\n\r\n"
        )
        .into_bytes();
        body.extend(std::iter::repeat(0u8).take(size));
        body.extend(format!("\r\n--{BOUNDARY}--\r\n").into_bytes());

        Request::post(format!(
            "/api/v1/interviews/{}/questions/0/recording/stop",
            uuid::Uuid::new_v4()
        ))
        .header(USER_EMAIL_HEADER, "dev@example.com")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "interview-api");
        assert_eq!(body["active_sessions"], 0);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let response = test_router()
            .oneshot(Request::get("/api/v1/interviews").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_recording_routes_require_identity() {
        let uri = format!(
            "/api/v1/interviews/{}/questions/0/recording/start",
            uuid::Uuid::new_v4()
        );
        let response = test_router()
            .oneshot(Request::post(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_interview_validates_before_generation() {
        let request = Request::post("/api/v1/interviews")
            .header(USER_EMAIL_HEADER, "dev@example.com")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"job_position": " ", "job_desc": "Rust", "job_experience": 3}).to_string(),
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_question_set_rejects_experience_out_of_range() {
        let request = Request::post("/api/v1/question-sets")
            .header(USER_EMAIL_HEADER, "dev@example.com")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "job_position": "Backend Engineer",
                    "job_desc": "Go",
                    "job_experience": 60,
                    "type_question": "Leetcode",
                    "company": "Acme"
                })
                .to_string(),
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_provider_key_is_service_unavailable() {
        let request = Request::post("/api/v1/interviews")
            .header(USER_EMAIL_HEADER, "dev@example.com")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"job_position": "Dev", "job_desc": "Rust", "job_experience": 3})
                    .to_string(),
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PROVIDER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_recording_upload_above_two_megabytes_is_read() {
        // The upload is accepted; the request then fails at the interview lookup.
        let response = test_router()
            .oneshot(audio_upload(2_500_000))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_recording_upload_over_configured_limit_is_rejected() {
        let config = Config {
            max_audio_bytes: 1024 * 1024,
            ..test_config()
        };
        let response = router_with(config)
            .oneshot(audio_upload(1_500_000))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
