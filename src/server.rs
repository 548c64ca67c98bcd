//! HTTP API for the assistant.
//!
//! Endpoint contract mirrors what the web front end consumes:
//! - `POST /api/chat`: reply text plus optional audio for one turn
//! - `POST /api/speech`: text-to-speech, absorbing every gateway failure
//!   into a mock payload (only empty text is a client error)
//! - `POST /api/recommend`: plan recommendation from the intake form
//! - `GET /api/admin/policy-sources`, `GET /api/admin/policy-details`:
//!   read-only views over the hosted policy database

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PlanTuning;
use crate::language::LanguageCode;
use crate::plans::{recommend, Recommendation, UserProfile};
use crate::reply::ReplyService;
use crate::speech::{ElevenLabsClient, SynthesisError, MOCK_AUDIO};
use crate::store::PolicyStore;

#[derive(Clone)]
pub struct ApiState {
    pub reply: Arc<ReplyService>,
    pub speech: Arc<ElevenLabsClient>,
    pub store: Arc<PolicyStore>,
    pub plans: PlanTuning,
}

// --- Request/Response types ---

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    /// Free-form on the wire; unknown codes fall back to English.
    #[serde(default)]
    language: String,
    /// Pre-composed reply text (the greeting path).
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_url: Option<String>,
}

#[derive(Deserialize)]
struct SpeechRequest {
    text: String,
    #[serde(default)]
    language: String,
}

#[derive(Serialize)]
struct SpeechResponse {
    success: bool,
    audio_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    speech_configured: bool,
}

/// Build the axum router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handle_status))
        .route("/api/chat", post(handle_chat))
        .route("/api/speech", post(handle_speech))
        .route("/api/recommend", post(handle_recommend))
        .route("/api/admin/policy-sources", get(handle_policy_sources))
        .route("/api/admin/policy-details", get(handle_policy_details))
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(
    state: ApiState,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Handlers ---

async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".into(),
        speech_configured: state.speech.is_configured(),
    })
}

async fn handle_chat(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let language = LanguageCode::parse_or_english(&req.language);
    let preview: String = req.message.chars().take(60).collect();
    info!("Chat turn [{language}]: \"{preview}\"");

    let reply = state
        .reply
        .reply(language, &req.message, req.text.as_deref())
        .await;

    Json(ChatResponse {
        text: reply.text,
        audio_url: reply.audio_url,
    })
}

async fn handle_speech(
    State(state): State<ApiState>,
    Json(req): Json<SpeechRequest>,
) -> Result<Json<SpeechResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Text is required".into(),
            }),
        ));
    }

    let language = LanguageCode::parse_or_english(&req.language);

    // Failures are invisible to the caller: real audio and the mock
    // placeholder share one success shape.
    let response = match state.speech.synthesize(&req.text, language).await {
        Ok(audio_data) => SpeechResponse {
            success: true,
            audio_data,
            message: Some("Text-to-speech conversion successful".into()),
        },
        Err(SynthesisError::Unconfigured) => SpeechResponse {
            success: true,
            audio_data: MOCK_AUDIO.into(),
            message: Some("Mock text-to-speech conversion successful".into()),
        },
        Err(e) => {
            warn!("Speech synthesis failed, returning mock audio: {e}");
            SpeechResponse {
                success: true,
                audio_data: MOCK_AUDIO.into(),
                message: Some("Mock text-to-speech conversion successful (fallback)".into()),
            }
        }
    };

    Ok(Json(response))
}

async fn handle_recommend(
    State(state): State<ApiState>,
    Json(profile): Json<UserProfile>,
) -> Json<Recommendation> {
    Json(recommend(&profile, &state.plans))
}

async fn handle_policy_sources(
    State(state): State<ApiState>,
) -> Result<Json<Vec<crate::store::PolicySource>>, (StatusCode, Json<ErrorResponse>)> {
    state
        .store
        .fetch_policy_sources()
        .await
        .map(Json)
        .map_err(store_error)
}

async fn handle_policy_details(
    State(state): State<ApiState>,
) -> Result<Json<Vec<crate::store::PolicyDetail>>, (StatusCode, Json<ErrorResponse>)> {
    state
        .store
        .fetch_policy_details()
        .await
        .map(Json)
        .map_err(store_error)
}

fn store_error(e: String) -> (StatusCode, Json<ErrorResponse>) {
    warn!("Policy store fetch failed: {e}");
    (StatusCode::BAD_GATEWAY, Json(ErrorResponse { error: e }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyStoreConfig;
    use crate::responses::response_for;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// State with an unconfigured speech gateway and an unreachable store:
    /// every test runs offline.
    fn offline_state() -> ApiState {
        let speech = Arc::new(ElevenLabsClient::unconfigured());
        ApiState {
            reply: Arc::new(ReplyService::new(Arc::clone(&speech))),
            speech,
            store: Arc::new(PolicyStore::new(&PolicyStoreConfig {
                url: "http://127.0.0.1:9".into(),
                anon_key: String::new(),
            })),
            plans: PlanTuning::default(),
        }
    }

    async fn post_json(path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router(offline_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn chat_returns_the_language_table_entry() {
        let (status, body) =
            post_json("/api/chat", serde_json::json!({"message": "hello", "language": "tamil"}))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["text"].as_str().unwrap(),
            response_for(LanguageCode::Tamil)
        );
        // Unconfigured gateway still attaches the mock placeholder.
        assert_eq!(body["audio_url"].as_str().unwrap(), MOCK_AUDIO);
    }

    #[tokio::test]
    async fn chat_with_unknown_language_falls_back_to_english() {
        let (status, body) =
            post_json("/api/chat", serde_json::json!({"message": "hi", "language": "latin"}))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["text"].as_str().unwrap(),
            response_for(LanguageCode::English)
        );
    }

    #[tokio::test]
    async fn chat_override_text_is_returned_verbatim() {
        let (status, body) = post_json(
            "/api/chat",
            serde_json::json!({
                "message": "greeting",
                "language": "hindi",
                "text": "custom greeting"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"].as_str().unwrap(), "custom greeting");
    }

    #[tokio::test]
    async fn speech_rejects_empty_text() {
        let (status, body) =
            post_json("/api/speech", serde_json::json!({"text": "  ", "language": "english"}))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"].as_str().unwrap(), "Text is required");
    }

    #[tokio::test]
    async fn speech_absorbs_missing_credentials_into_mock_success() {
        let (status, body) =
            post_json("/api/speech", serde_json::json!({"text": "hello", "language": "tamil"}))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["audio_data"].as_str().unwrap(), MOCK_AUDIO);
        assert!(body["message"].as_str().unwrap().starts_with("Mock"));
    }

    #[tokio::test]
    async fn recommend_reproduces_the_reference_example() {
        let (status, body) = post_json(
            "/api/recommend",
            serde_json::json!({
                "age": 65,
                "family_size": "1",
                "budget": 20000,
                "coverage_amount": 10
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary"]["name"], "Senior Care Plus");
        assert_eq!(body["primary"]["premium"], "₹12,000/year");
        assert_eq!(body["alternatives"][0]["premium"], "₹17,000/year");
        assert_eq!(body["alternatives"][0]["coverage"], "₹8 Lakhs");
        assert_eq!(body["alternatives"][1]["premium"], "₹25,000/year");
        assert_eq!(body["alternatives"][1]["coverage"], "₹15 Lakhs");
    }

    #[tokio::test]
    async fn admin_surfaces_store_failures_as_bad_gateway() {
        let response = router(offline_state())
            .oneshot(
                Request::builder()
                    .uri("/api/admin/policy-sources")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn status_reports_unconfigured_speech() {
        let response = router(offline_state())
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["speech_configured"], false);
    }
}
