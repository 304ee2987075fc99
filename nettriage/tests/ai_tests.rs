//! Completion providers against a local stub server

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use nettriage::ai::{AIError, CompletionProvider, OpenAiClient, ProxyClient};
use nettriage::prelude::*;
use nettriage::ProviderKind;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tempfile::TempDir;

async fn spawn_stub(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Answers like a sloppy model: wrong types, alias fields, too many questions
async fn messy_proxy(Json(body): Json<Value>) -> Json<Value> {
    json!({
        "solutions": ["Restart the router", 42, null, "Move closer to the access point"],
        "explanation": "Weak signal in the bedroom",
        "confidence": 150,
        "followUpQuestions": ["q1", "q2", "q3", "q4"],
        "detectedIssues": [body["problem"].clone()]
    })
    .into()
}

async fn failing_proxy() -> impl IntoResponse {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({"error": "OpenAI key not configured on server"})),
    )
}

async fn rate_limited() -> impl IntoResponse {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("retry-after", "86400")],
        Json(json!({"error": "slow down"})),
    )
}

async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer sk-test");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");

    let content = "Here is the diagnosis:\n```json\n{\"solutions\": [\"Update the router firmware\"], \"reasoning\": \"Old firmware\", \"confidence\": 81.6, \"followUpQuestions\": [], \"detectedIssues\": [\"router_issues\"]}\n```";
    (
        StatusCode::OK,
        Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})),
    )
}

#[tokio::test]
async fn test_proxy_reply_is_coerced() {
    let addr = spawn_stub(Router::new().route("/api/ai", post(messy_proxy))).await;
    let client = ProxyClient::new(format!("http://{}/api/ai", addr));

    let d = client.diagnose("wifi weak in bedroom").await.unwrap();
    assert_eq!(
        d.solutions,
        vec!["Restart the router", "Move closer to the access point"]
    );
    assert_eq!(d.reasoning.as_deref(), Some("Weak signal in the bedroom"));
    assert_eq!(d.confidence, 100);
    assert_eq!(d.follow_up_questions.len(), 3);
    assert_eq!(d.detected_issues, vec!["wifi weak in bedroom"]);
}

#[tokio::test]
async fn test_proxy_error_keeps_status_and_body() {
    let addr = spawn_stub(Router::new().route("/api/ai", post(failing_proxy))).await;
    let client = ProxyClient::new(format!("http://{}/api/ai", addr));

    match client.diagnose("slow").await {
        Err(AIError::ApiError { status, message }) => {
            assert_eq!(status, 502);
            assert!(message.contains("not configured"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_endpoint_override() {
    let addr = spawn_stub(Router::new().route("/v1/chat/completions", post(chat_completions))).await;
    let endpoint = format!("http://{}/v1/chat/completions", addr);

    let client = OpenAiClient::new("sk-test".to_string())
        .with_endpoint(endpoint.clone())
        .with_max_retries(0);
    let d = client.diagnose("router keeps rebooting").await.unwrap();
    assert_eq!(d.solutions, vec!["Update the router firmware"]);
    assert_eq!(d.confidence, 82);
    assert_eq!(d.reasoning.as_deref(), Some("Old firmware"));

    let wrong_key = OpenAiClient::new("sk-wrong".to_string())
        .with_endpoint(endpoint)
        .with_max_retries(0);
    assert!(matches!(
        wrong_key.diagnose("router keeps rebooting").await,
        Err(AIError::ApiError { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_troubleshooter_ai_path_records_history() {
    let addr = spawn_stub(Router::new().route("/api/ai", post(messy_proxy))).await;
    let temp_dir = TempDir::new().unwrap();

    let mut config = TriageConfig::default();
    config.ai.provider = ProviderKind::Proxy;
    config.ai.endpoint = Some(format!("http://{}/api/ai", addr));
    config.history.db_path = Some(temp_dir.path().join("history.db"));

    let t = Troubleshooter::from_config(&config).unwrap();
    let options = DiagnoseOptions {
        use_ai: true,
        ..DiagnoseOptions::default()
    };
    let report = t.diagnose("wifi weak in bedroom", &options).await.unwrap();
    assert!(report.history_id.is_some());

    let recent = t.recent_history(None);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].problem, "wifi weak in bedroom");
    assert_eq!(recent[0].solutions, report.diagnosis.solutions);
}

#[tokio::test]
async fn test_rate_limit_wait_is_bounded() {
    let addr = spawn_stub(Router::new().route("/v1/chat/completions", post(rate_limited))).await;
    let endpoint = format!("http://{}/v1/chat/completions", addr);

    let client = OpenAiClient::new("sk-test".to_string())
        .with_endpoint(endpoint.clone())
        .with_max_retries(0);
    assert!(matches!(
        client.diagnose("slow").await,
        Err(AIError::RateLimited { retry_after: 86400 })
    ));

    // one retry waits at most 2s even though the server asked for a day
    let client = OpenAiClient::new("sk-test".to_string())
        .with_endpoint(endpoint)
        .with_max_retries(1);
    let started = std::time::Instant::now();
    assert!(matches!(
        client.diagnose("slow").await,
        Err(AIError::RateLimited { .. })
    ));
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}
