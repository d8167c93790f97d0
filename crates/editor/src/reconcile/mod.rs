//! Panel edits to canonical mutations.
//!
//! Each panel has a change enum and a function `(&AgentRecord, change) ->
//! Vec<Mutation>`. The record is only read; the caller dispatches the
//! result as one batch. Unit conversions are the inverse of the ones in
//! [`projection`](crate::projection).

mod tools;

pub use tools::*;

use callie_domain::agent::{
    AgentRecord, ExtractionItem, GreetingType, LlmMutation, Mutation, PostCallMutation,
    StartSpeaker, SttMutation, TtsMutation, VoiceDescriptor, VoicemailAction, VoicemailMutation,
    DEFAULT_RE_ENGAGE_ATTEMPTS, GENERAL_PROMPT_MAX_CHARS,
};
use serde::Deserialize;

use crate::projection::{split_keywords, KnowledgeBaseItem, MS_PER_MINUTE, MS_PER_SECOND};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Change enums
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum IdentityChange {
    Name(String),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum LlmChange {
    Provider(String),
    Model(String),
    MaxTokens(u32),
    Temperature(f64),
    TopK(u32),
    KbTopK(u32),
    KbFilterScore(f64),
    KnowledgeBase(Vec<KnowledgeBaseItem>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum AudioChange {
    Language(String),
    SttProvider(String),
    SttModel(String),
    /// Comma-separated, as typed.
    SttKeywords(String),
    TtsProvider(String),
    TtsModel(String),
    TtsVoiceId(String),
    Voice(Option<VoiceDescriptor>),
    Speed(f64),
    Stability(f64),
    SimilarityBoost(f64),
    StyleExaggeration(f64),
    Volume(f64),
    Pitch(f64),
    Temperature(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum CallSettingsChange {
    WelcomeMessage(String),
    FirstSpeaker(StartSpeaker),
    UserGreetingType(GreetingType),
    WaitDurationMs(u64),
    ReEngageEnabled(bool),
    ReEngageMessage(String),
    ReEngageAttempts(u32),
    IvrHangupEnabled(bool),
    VoicemailDetectionEnabled(bool),
    VoicemailAction(VoicemailAction),
    VoicemailMessage(String),
    /// Seconds.
    NoResponseTime(f64),
    /// Minutes.
    MaxCallDuration(f64),
    /// Seconds.
    MaxRingDuration(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum PostCallChange {
    ExtractionItems(Vec<ExtractionItem>),
    WebhookEnabled(bool),
    WebhookUrl(String),
    /// Seconds.
    WebhookTimeout(u32),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Simple panels
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn identity(_rec: &AgentRecord, change: IdentityChange) -> Vec<Mutation> {
    match change {
        IdentityChange::Name(name) => vec![Mutation::AgentName(name)],
        IdentityChange::Description(prompt) => {
            vec![LlmMutation::GeneralPrompt(truncate_chars(prompt, GENERAL_PROMPT_MAX_CHARS)).into()]
        }
    }
}

pub fn llm(_rec: &AgentRecord, change: LlmChange) -> Vec<Mutation> {
    let m = match change {
        LlmChange::Provider(v) => LlmMutation::Provider(v),
        LlmChange::Model(v) => LlmMutation::Model(v),
        LlmChange::MaxTokens(v) => LlmMutation::MaxTokens(v),
        LlmChange::Temperature(v) => LlmMutation::Temperature(v),
        LlmChange::TopK(v) => LlmMutation::TopK(v),
        LlmChange::KbTopK(v) => LlmMutation::KbTopK(v),
        LlmChange::KbFilterScore(v) => LlmMutation::KbFilterScore(v),
        LlmChange::KnowledgeBase(items) => {
            let mut ids: Vec<String> = Vec::with_capacity(items.len());
            for item in items {
                if !item.id.is_empty() && !ids.contains(&item.id) {
                    ids.push(item.id);
                }
            }
            LlmMutation::KnowledgeBaseIds(ids)
        }
    };
    vec![m.into()]
}

pub fn audio(_rec: &AgentRecord, change: AudioChange) -> Vec<Mutation> {
    match change {
        AudioChange::Language(v) => vec![Mutation::Language(v)],
        AudioChange::SttProvider(v) => vec![SttMutation::Provider(v).into()],
        AudioChange::SttModel(v) => vec![SttMutation::Model(v).into()],
        AudioChange::SttKeywords(v) => vec![SttMutation::Keywords(split_keywords(&v)).into()],
        AudioChange::TtsProvider(v) => vec![TtsMutation::Provider(v).into()],
        AudioChange::TtsModel(v) => vec![TtsMutation::Model(v).into()],
        AudioChange::TtsVoiceId(v) => vec![TtsMutation::VoiceId(v).into()],
        AudioChange::Voice(voice) => {
            // Picking a voice also sets the id the backend reads.
            let mut out = Vec::with_capacity(2);
            if let Some(v) = &voice {
                out.push(TtsMutation::VoiceId(v.voice_id.clone()).into());
            }
            out.push(TtsMutation::Voice(voice).into());
            out
        }
        AudioChange::Speed(v) => vec![TtsMutation::Speed(v).into()],
        AudioChange::Stability(v) => vec![TtsMutation::Stability(v).into()],
        AudioChange::SimilarityBoost(v) => vec![TtsMutation::SimilarityBoost(v).into()],
        AudioChange::StyleExaggeration(v) => vec![TtsMutation::StyleExaggeration(v).into()],
        AudioChange::Volume(v) => vec![TtsMutation::Volume(v).into()],
        AudioChange::Pitch(v) => vec![TtsMutation::Pitch(v).into()],
        AudioChange::Temperature(v) => vec![TtsMutation::Temperature(v).into()],
    }
}

pub fn call_settings(rec: &AgentRecord, change: CallSettingsChange) -> Vec<Mutation> {
    match change {
        CallSettingsChange::WelcomeMessage(v) => vec![LlmMutation::BeginMessage(v).into()],
        CallSettingsChange::FirstSpeaker(v) => vec![LlmMutation::StartSpeaker(v).into()],
        CallSettingsChange::UserGreetingType(v) => vec![Mutation::UserGreetingType(v)],
        CallSettingsChange::WaitDurationMs(v) => vec![Mutation::WaitDurationMs(v)],
        CallSettingsChange::ReEngageEnabled(false) => vec![Mutation::ReEngageAttempts(0)],
        CallSettingsChange::ReEngageEnabled(true) if rec.re_engage_attempts == 0 => {
            vec![Mutation::ReEngageAttempts(DEFAULT_RE_ENGAGE_ATTEMPTS)]
        }
        CallSettingsChange::ReEngageEnabled(true) => Vec::new(),
        CallSettingsChange::ReEngageMessage(v) => vec![Mutation::ReEngageMessage(v)],
        CallSettingsChange::ReEngageAttempts(v) => vec![Mutation::ReEngageAttempts(v)],
        CallSettingsChange::IvrHangupEnabled(v) => vec![Mutation::IvrHangup(v)],
        CallSettingsChange::VoicemailDetectionEnabled(v) => {
            vec![VoicemailMutation::Enabled(v).into()]
        }
        CallSettingsChange::VoicemailAction(v) => vec![VoicemailMutation::Action(v).into()],
        CallSettingsChange::VoicemailMessage(v) => vec![VoicemailMutation::Message(v).into()],
        CallSettingsChange::NoResponseTime(secs) => {
            vec![Mutation::NoResponseTimeoutMs(to_millis(secs, MS_PER_SECOND))]
        }
        CallSettingsChange::MaxCallDuration(mins) => {
            vec![Mutation::MaxCallDurationMs(to_millis(mins, MS_PER_MINUTE))]
        }
        CallSettingsChange::MaxRingDuration(secs) => {
            vec![Mutation::RingTimeoutMs(to_millis(secs, MS_PER_SECOND))]
        }
    }
}

pub fn post_call(_rec: &AgentRecord, change: PostCallChange) -> Vec<Mutation> {
    let m = match change {
        PostCallChange::ExtractionItems(v) => PostCallMutation::ExtractionItems(v),
        PostCallChange::WebhookEnabled(v) => PostCallMutation::WebhookEnabled(v),
        PostCallChange::WebhookUrl(v) => PostCallMutation::WebhookUrl(v),
        PostCallChange::WebhookTimeout(v) => PostCallMutation::WebhookTimeout(v),
    };
    vec![m.into()]
}

// ── helpers ─────────────────────────────────────────────────────────

/// Negative and non-finite inputs clamp to zero.
fn to_millis(value: f64, scale: f64) -> u64 {
    let ms = (value * scale).round();
    if ms.is_finite() && ms > 0.0 {
        ms as u64
    } else {
        0
    }
}

fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_owned(),
        None => s,
    }
}
