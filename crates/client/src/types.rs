//! Data Transfer Objects matching the dashboard backend's JSON.
//!
//! Field names use `camelCase` on the wire and `snake_case` in Rust code.
//! Nearly everything is optional because the backend omits fields freely
//! (a fresh template shell carries little more than `agentId` and
//! `responseEngine`).

use callie_domain::agent::GreetingType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Voice agent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /api/v1/get-voice-agent/{id}: response body, also the publish payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAgentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_engine: Option<ResponseEngineRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    /// Kept raw so hydration overlays only the keys present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stt_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_call_duration_ms: Option<u64>,
    #[serde(default, rename = "ringTimeOutMs", skip_serializing_if = "Option::is_none")]
    pub ring_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_response_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_voicemail_detection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_mail_detection: Option<VoicemailOptionDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_call_analysis_data: Option<Vec<AnalysisFieldDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ivrhangup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_engage_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_engage_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_greeting_type: Option<GreetingType>,
}

impl VoiceAgentDto {
    /// The LLM to fetch alongside this shell, if its engine is prompt-based.
    pub fn llm_id(&self) -> Option<&str> {
        self.response_engine.as_ref().and_then(ResponseEngineRef::llm_id)
    }
}

/// Which engine drives the agent.
///
/// The template endpoint sometimes returns `{ llmId }` without a `type`;
/// that shape is treated as an LLM reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEngineRef {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EngineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_flow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl ResponseEngineRef {
    pub fn reacherr_llm(llm_id: impl Into<String>) -> Self {
        Self {
            kind: Some(EngineType::ReacherrLlm),
            llm_id: Some(llm_id.into()),
            ..Default::default()
        }
    }

    pub fn llm_id(&self) -> Option<&str> {
        if self.kind == Some(EngineType::Conversational) {
            return None;
        }
        self.llm_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineType {
    #[serde(rename = "REACHERR_LLM")]
    ReacherrLlm,
    #[serde(rename = "CONVERSATIONAL")]
    Conversational,
}

// ── voicemail ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicemailOptionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<VoicemailActionDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Legacy convenience field some agents still carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoicemailActionDto {
    Hangup,
    StaticText {
        #[serde(default)]
        text: String,
    },
    Prompt {
        #[serde(default)]
        prompt: String,
    },
}

// ── post-call analysis ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFieldDto {
    #[serde(rename = "type")]
    pub kind: AnalysisFieldType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFieldType {
    String,
    Boolean,
    Number,
    Enum,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Templates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /api/v1/templates: one element of the response array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `single-prompt` or `conversational-flow`.
    #[serde(default)]
    pub template_type: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Phone numbers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/v1/list-phone-number: one element of the response array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberDto {
    pub phone_number: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone_number_type: Option<String>,
    #[serde(default)]
    pub is_toll_free: Option<bool>,
    #[serde(default)]
    pub inbound_agent_id: Option<String>,
    #[serde(default)]
    pub outbound_agent_id: Option<String>,
}

/// POST /api/v1/update-phone-number/{number}: request body.
///
/// `None` serializes as `null`, which clears the assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneAssignmentUpdate {
    pub phone_number: String,
    pub inbound_agent_id: Option<String>,
    pub outbound_agent_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Auth
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/v1/auth/refresh: request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// POST /api/v1/auth/refresh: response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Tokens are only rotated when this is `JWT`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
