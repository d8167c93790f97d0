//! Integration tests for `RestAgentClient` against a wiremock backend.

use callie_client::{AgentApi, PhoneAssignmentUpdate, RestAgentClient, SessionEvent};
use callie_domain::agent::LlmConfig;
use callie_domain::config::ApiConfig;
use callie_domain::error::Error;
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        timeout_ms: 5_000,
        max_retries: 2,
        access_token_env: String::new(),
        refresh_token_env: String::new(),
    }
}

fn client(server: &MockServer, access: Option<&str>, refresh: Option<&str>) -> RestAgentClient {
    RestAgentClient::new(&config(server))
        .unwrap()
        .with_tokens(access.map(str::to_owned), refresh.map(str::to_owned))
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn fetch_agent_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/get-voice-agent/a1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agentId": "a1",
            "agentName": "Front desk",
            "responseEngine": { "type": "REACHERR_LLM", "llmId": "llm-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shell = client(&server, Some("tok"), None).fetch_agent("a1").await.unwrap();
    assert_eq!(shell.agent_name.as_deref(), Some("Front desk"));
    assert_eq!(shell.llm_id(), Some("llm-1"));
}

#[tokio::test]
async fn ids_are_sent_as_a_single_encoded_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/get-voice-agent/a%2Fb%20c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "agentId": "a/b c" })))
        .expect(1)
        .mount(&server)
        .await;

    let shell = client(&server, None, None).fetch_agent("a/b c").await.unwrap();
    assert_eq!(shell.agent_id.as_deref(), Some("a/b c"));
}

#[tokio::test]
async fn list_templates_parses_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "t1", "name": "Receptionist", "description": "Answers calls", "templateType": "single-prompt" },
            { "id": "t2", "name": "Survey" }
        ])))
        .mount(&server)
        .await;

    let templates = client(&server, None, None).list_templates().await.unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].template_type.as_deref(), Some("single-prompt"));
    assert_eq!(templates[1].description, "");
}

// ============================================================================
// Retry policy
// ============================================================================

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/get-reacherr-llm/llm-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/get-reacherr-llm/llm-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "llmId": "llm-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let llm = client(&server, None, None).fetch_llm("llm-1").await.unwrap();
    assert_eq!(llm["llmId"], "llm-1");
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/templates"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server, None, None).list_templates().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 502, .. }), "{err}");
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/create-agent-from-template/t9"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown template"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, None, None)
        .create_from_template("t9")
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "unknown template");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_agent_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/get-voice-agent/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, None, None).fetch_agent("nope").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

// ============================================================================
// Token refresh
// ============================================================================

#[tokio::test]
async fn unauthorized_request_refreshes_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/templates"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "JWT",
            "accessToken": "fresh",
            "refreshToken": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/templates"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Some("stale"), Some("r1"));
    let templates = client.list_templates().await.unwrap();
    assert!(templates.is_empty());
    assert_eq!(client.access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn unauthorized_without_refresh_token_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/list-phone-number"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = client(&server, Some("stale"), None).with_session_events(tx);

    let err = client.list_phone_numbers().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(
        rx.try_recv().unwrap(),
        SessionEvent::Expired {
            endpoint: "POST /api/v1/list-phone-number".into()
        }
    );
    assert!(client.access_token().is_none());
}

#[tokio::test]
async fn non_jwt_refresh_response_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/get-voice-agent/a1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "OTP_REQUIRED" })))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = client(&server, Some("stale"), Some("r1")).with_session_events(tx);

    let err = client.fetch_agent("a1").await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert!(rx.try_recv().is_ok());
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn save_llm_patches_by_llm_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/update-reacherr-llm/llm-42"))
        .and(body_partial_json(json!({ "llmId": "llm-42", "temperature": 0.7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let llm = LlmConfig {
        llm_id: "llm-42".into(),
        temperature: 0.7,
        ..Default::default()
    };
    client(&server, None, None).save_llm(&llm).await.unwrap();
}

#[tokio::test]
async fn save_llm_without_id_is_rejected_locally() {
    let server = MockServer::start().await;
    let err = client(&server, None, None)
        .save_llm(&LlmConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Other(_)));
}

#[tokio::test]
async fn phone_update_posts_assignment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/update-phone-number/+15550001111"))
        .and(body_json(json!({
            "phoneNumber": "+15550001111",
            "inboundAgentId": "a1",
            "outboundAgentId": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, None, None)
        .update_phone_number(&PhoneAssignmentUpdate {
            phone_number: "+15550001111".into(),
            inbound_agent_id: Some("a1".into()),
            outbound_agent_id: None,
        })
        .await
        .unwrap();
}
