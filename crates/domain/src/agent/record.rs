use serde::{Deserialize, Serialize};

use super::tool::ToolEntry;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Canonical agent record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One voice agent's full configuration.
///
/// Every field is defaulted on deserialize so a partial document (a
/// template shell, a stale export) hydrates into a complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentRecord {
    /// Empty until the agent is first persisted.
    pub agent_id: String,
    pub agent_name: String,
    pub channel: String,
    pub language: String,

    pub max_call_duration_ms: u64,
    #[serde(rename = "ringTimeOutMs")]
    pub ring_timeout_ms: u64,
    pub no_response_timeout_ms: u64,
    pub wait_duration_ms: u64,
    #[serde(alias = "ivrhangup")]
    pub ivr_hangup: bool,
    pub re_engage_attempts: u32,
    pub re_engage_message: String,
    pub user_greeting_type: GreetingType,

    pub tts_config: TtsConfig,
    pub stt_config: SttConfig,
    #[serde(rename = "reacherrLlmData")]
    pub llm: LlmConfig,
    pub post_call_analysis: PostCallAnalysis,
    pub voicemail_detection: VoicemailDetection,
    pub version_metadata: VersionMetadata,
}

impl Default for AgentRecord {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            agent_name: String::new(),
            channel: "voice".into(),
            language: "en-US".into(),
            max_call_duration_ms: 600_000,
            ring_timeout_ms: 30_000,
            no_response_timeout_ms: 15_000,
            wait_duration_ms: 1_000,
            ivr_hangup: true,
            re_engage_attempts: DEFAULT_RE_ENGAGE_ATTEMPTS,
            re_engage_message: "I'm sorry, I didn't catch that. Are you still there?".into(),
            user_greeting_type: GreetingType::Static,
            tts_config: TtsConfig::default(),
            stt_config: SttConfig::default(),
            llm: LlmConfig::default(),
            post_call_analysis: PostCallAnalysis::default(),
            voicemail_detection: VoicemailDetection::default(),
            version_metadata: VersionMetadata::default(),
        }
    }
}

/// Attempts restored when re-engagement is switched back on from zero.
pub const DEFAULT_RE_ENGAGE_ATTEMPTS: u32 = 3;

/// UI input cap for the general prompt.
pub const GENERAL_PROMPT_MAX_CHARS: usize = 8_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreetingType {
    #[default]
    Static,
    Dynamic,
}

// ── audio ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TtsConfig {
    pub provider: String,
    pub model: String,
    pub voice_id: String,
    pub settings: TtsSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceDescriptor>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: "cartesia".into(),
            model: "sonic-english".into(),
            voice_id: String::new(),
            settings: TtsSettings::default(),
            voice: None,
        }
    }
}

/// Numeric synthesis knobs. Valid ranges are provider-defined and not
/// checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TtsSettings {
    #[serde(alias = "voiceSpeed")]
    pub speed: f64,
    pub volume: f64,
    pub stability: f64,
    pub similarity_boost: f64,
    pub style_exaggeration: f64,
    pub pitch: f64,
    #[serde(alias = "voiceTemperature")]
    pub temperature: f64,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            volume: 1.0,
            stability: 0.5,
            similarity_boost: 0.5,
            style_exaggeration: 0.0,
            pitch: 0.0,
            temperature: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceDescriptor {
    pub voice_id: String,
    pub display_name: String,
    pub gender: String,
    pub provider: String,
    pub accent: String,
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SttConfig {
    pub provider: String,
    pub model: String,
    pub settings: SttSettings,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: "deepgram".into(),
            model: "nova-2".into(),
            settings: SttSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SttSettings {
    /// Order matters: earlier keywords weigh more in recognition.
    pub keywords: Vec<String>,
}

// ── LLM ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub llm_id: String,
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub general_prompt: String,
    pub begin_message: String,
    pub start_speaker: StartSpeaker,
    pub model_high_priority: bool,
    pub tool_call_strict_mode: bool,
    pub kb_config: KbConfig,
    pub general_tools: Vec<ToolEntry>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_id: String::new(),
            provider: "azure".into(),
            model: "gpt-4o".into(),
            max_tokens: 450,
            temperature: 0.2,
            top_k: 40,
            general_prompt: String::new(),
            begin_message: String::new(),
            start_speaker: StartSpeaker::Ai,
            model_high_priority: true,
            tool_call_strict_mode: true,
            kb_config: KbConfig::default(),
            general_tools: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartSpeaker {
    User,
    #[default]
    Ai,
    AiDynamic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KbConfig {
    pub top_k: u32,
    pub filter_score: f64,
    /// Treated as a set: the reconciler never writes duplicates.
    pub knowledge_base_ids: Vec<String>,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            filter_score: 0.6,
            knowledge_base_ids: Vec::new(),
        }
    }
}

// ── post-call analysis ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostCallAnalysis {
    pub webhook_enabled: bool,
    pub webhook_url: String,
    /// Seconds.
    pub webhook_timeout: u32,
    pub extraction_items: Vec<ExtractionItem>,
}

impl Default for PostCallAnalysis {
    fn default() -> Self {
        Self {
            webhook_enabled: false,
            webhook_url: String::new(),
            webhook_timeout: 45,
            extraction_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionItem {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ExtractionType,
    /// Only meaningful for [`ExtractionType::Selector`].
    pub options: Vec<String>,
    pub enabled: bool,
    pub is_optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionType {
    #[default]
    Text,
    Boolean,
    Number,
    Selector,
}

// ── voicemail ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoicemailDetection {
    pub enabled: bool,
    pub action: VoicemailAction,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicemailAction {
    #[default]
    Hangup,
    #[serde(alias = "leave_message")]
    StaticText,
    Prompt,
}

// ── versioning ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionMetadata {
    pub version: u32,
    pub version_name: String,
    pub version_description: String,
    pub is_published: bool,
    /// Unix millis.
    pub last_modification_timestamp: i64,
    pub inbound_assigned: bool,
    pub outbound_assigned: bool,
}

impl Default for VersionMetadata {
    fn default() -> Self {
        Self {
            version: 1,
            version_name: "V0".into(),
            version_description: String::new(),
            is_published: false,
            last_modification_timestamp: 0,
            inbound_assigned: false,
            outbound_assigned: false,
        }
    }
}
