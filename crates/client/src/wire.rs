//! Mapping between the backend's wire shape and the canonical record.
//!
//! Hydration renames wire fields into their canonical positions, overlays
//! the result onto [`AgentRecord::default`] and then overlays the LLM body
//! at `reacherrLlmData`. Publishing is the inverse over the full record.

use callie_domain::agent::{
    AgentRecord, ExtractionItem, ExtractionType, VoicemailAction,
};
use callie_domain::error::Result;
use callie_domain::overlay::overlay;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::types::{
    AnalysisFieldDto, AnalysisFieldType, ResponseEngineRef, VoiceAgentDto, VoicemailActionDto,
    VoicemailOptionDto,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Hydration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a full record from an agent shell and, when the engine is
/// prompt-based, the raw LLM body.
///
/// `defaults ← overlay(shell) ← overlay({reacherrLlmData: llm})`. Fields
/// neither document carries keep their default value.
pub fn hydrate(shell: &VoiceAgentDto, llm: Option<Value>) -> Result<AgentRecord> {
    let mut doc = serde_json::to_value(AgentRecord::default())?;
    overlay(&mut doc, shell_patch(shell)?);
    if let Some(llm) = llm {
        overlay(&mut doc, json!({ "reacherrLlmData": normalize_llm(llm) }));
    }

    let mut record: AgentRecord = serde_json::from_value(doc)?;
    if record.llm.llm_id.is_empty() {
        if let Some(id) = shell.llm_id() {
            record.llm.llm_id = id.to_owned();
        }
    }
    Ok(record)
}

/// Canonical-shaped patch holding only the fields the shell carries.
fn shell_patch(shell: &VoiceAgentDto) -> Result<Value> {
    let mut root = Map::new();
    put(&mut root, "agentId", &shell.agent_id)?;
    put(&mut root, "agentName", &shell.agent_name)?;
    put(&mut root, "channel", &shell.channel)?;
    put(&mut root, "language", &shell.language)?;
    put(&mut root, "maxCallDurationMs", &shell.max_call_duration_ms)?;
    put(&mut root, "ringTimeOutMs", &shell.ring_timeout_ms)?;
    put(&mut root, "noResponseTimeoutMs", &shell.no_response_timeout_ms)?;
    put(&mut root, "waitDurationMs", &shell.wait_duration_ms)?;
    put(&mut root, "ivrHangup", &shell.ivrhangup)?;
    put(&mut root, "reEngageAttempts", &shell.re_engage_attempts)?;
    put(&mut root, "reEngageMessage", &shell.re_engage_message)?;
    put(&mut root, "userGreetingType", &shell.user_greeting_type)?;
    put(&mut root, "ttsConfig", &shell.tts_config)?;
    put(&mut root, "sttConfig", &shell.stt_config)?;

    let mut post_call = Map::new();
    if let Some(url) = &shell.webhook_url {
        post_call.insert("webhookEnabled".into(), Value::Bool(!url.trim().is_empty()));
        post_call.insert("webhookUrl".into(), Value::String(url.clone()));
    }
    let timeout_secs = shell
        .webhook_timeout_ms
        .map(|ms| u32::try_from(ms.saturating_add(500) / 1000).unwrap_or(u32::MAX));
    put(&mut post_call, "webhookTimeout", &timeout_secs)?;
    if let Some(fields) = &shell.post_call_analysis_data {
        let items: Vec<ExtractionItem> = fields.iter().map(extraction_item).collect();
        put(&mut post_call, "extractionItems", &Some(items))?;
    }
    nest(&mut root, "postCallAnalysis", post_call);

    let mut voicemail = Map::new();
    let vm = shell.voice_mail_detection.as_ref();
    let enabled = shell
        .enable_voicemail_detection
        .or_else(|| vm.and_then(|v| v.enabled));
    put(&mut voicemail, "enabled", &enabled)?;
    if let Some(vm) = vm {
        let (action, message) = match &vm.action {
            Some(VoicemailActionDto::Hangup) => (Some(VoicemailAction::Hangup), None),
            Some(VoicemailActionDto::StaticText { text }) => {
                (Some(VoicemailAction::StaticText), Some(text.clone()))
            }
            Some(VoicemailActionDto::Prompt { prompt }) => {
                (Some(VoicemailAction::Prompt), Some(prompt.clone()))
            }
            None => (None, None),
        };
        put(&mut voicemail, "action", &action)?;
        put(&mut voicemail, "message", &message.or_else(|| vm.message.clone()))?;
    }
    nest(&mut root, "voicemailDetection", voicemail);

    let mut version = Map::new();
    put(&mut version, "version", &shell.version)?;
    put(&mut version, "versionName", &shell.version_name)?;
    put(&mut version, "versionDescription", &shell.version_description)?;
    put(&mut version, "isPublished", &shell.is_published)?;
    put(&mut version, "lastModificationTimestamp", &shell.last_updated_timestamp)?;
    nest(&mut root, "versionMetadata", version);

    Ok(Value::Object(root))
}

/// Older LLM bodies keep `knowledgeBaseIds` at the top level.
fn normalize_llm(mut llm: Value) -> Value {
    if let Some(obj) = llm.as_object_mut() {
        if let Some(ids) = obj.remove("knowledgeBaseIds") {
            let kb = obj
                .entry("kbConfig")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(kb) = kb.as_object_mut() {
                kb.entry("knowledgeBaseIds").or_insert(ids);
            }
        }
    }
    llm
}

fn extraction_item(field: &AnalysisFieldDto) -> ExtractionItem {
    ExtractionItem {
        id: field.name.clone(),
        name: field.name.clone(),
        description: field.description.clone(),
        kind: match field.kind {
            AnalysisFieldType::String => ExtractionType::Text,
            AnalysisFieldType::Boolean => ExtractionType::Boolean,
            AnalysisFieldType::Number => ExtractionType::Number,
            AnalysisFieldType::Enum => ExtractionType::Selector,
        },
        options: field.choices.clone().unwrap_or_default(),
        enabled: true,
        is_optional: false,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Publish payload
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Flatten the record back into the wire shape expected by
/// `publish-voice-agent`.
pub fn publish_payload(rec: &AgentRecord) -> Result<VoiceAgentDto> {
    let post_call = &rec.post_call_analysis;
    let vm = &rec.voicemail_detection;
    let meta = &rec.version_metadata;

    let action = match vm.action {
        VoicemailAction::Hangup => VoicemailActionDto::Hangup,
        VoicemailAction::StaticText => VoicemailActionDto::StaticText {
            text: vm.message.clone(),
        },
        VoicemailAction::Prompt => VoicemailActionDto::Prompt {
            prompt: vm.message.clone(),
        },
    };

    Ok(VoiceAgentDto {
        agent_id: non_empty(&rec.agent_id),
        version: Some(meta.version),
        last_updated_timestamp: (meta.last_modification_timestamp > 0)
            .then_some(meta.last_modification_timestamp),
        response_engine: non_empty(&rec.llm.llm_id).map(ResponseEngineRef::reacherr_llm),
        agent_name: Some(rec.agent_name.clone()),
        is_published: Some(meta.is_published),
        tts_config: Some(serde_json::to_value(&rec.tts_config)?),
        stt_config: Some(serde_json::to_value(&rec.stt_config)?),
        language: Some(rec.language.clone()),
        channel: Some(rec.channel.clone()),
        webhook_url: Some(if post_call.webhook_enabled {
            post_call.webhook_url.clone()
        } else {
            String::new()
        }),
        webhook_timeout_ms: Some(u64::from(post_call.webhook_timeout) * 1000),
        max_call_duration_ms: Some(rec.max_call_duration_ms),
        ring_timeout_ms: Some(rec.ring_timeout_ms),
        no_response_timeout_ms: Some(rec.no_response_timeout_ms),
        enable_voicemail_detection: Some(vm.enabled),
        voice_mail_detection: Some(VoicemailOptionDto {
            action: Some(action),
            enabled: Some(vm.enabled),
            message: None,
        }),
        post_call_analysis_data: Some(
            post_call
                .extraction_items
                .iter()
                .map(analysis_field)
                .collect(),
        ),
        version_description: Some(meta.version_description.clone()),
        version_name: Some(meta.version_name.clone()),
        ivrhangup: Some(rec.ivr_hangup),
        re_engage_attempts: Some(rec.re_engage_attempts),
        re_engage_message: Some(rec.re_engage_message.clone()),
        wait_duration_ms: Some(rec.wait_duration_ms),
        user_greeting_type: Some(rec.user_greeting_type),
    })
}

fn analysis_field(item: &ExtractionItem) -> AnalysisFieldDto {
    let (kind, choices) = match item.kind {
        ExtractionType::Text => (AnalysisFieldType::String, None),
        ExtractionType::Boolean => (AnalysisFieldType::Boolean, None),
        ExtractionType::Number => (AnalysisFieldType::Number, None),
        ExtractionType::Selector => (AnalysisFieldType::Enum, Some(item.options.clone())),
    };
    AnalysisFieldDto {
        kind,
        name: item.name.clone(),
        description: item.description.clone(),
        choices,
        examples: None,
    }
}

// ── helpers ─────────────────────────────────────────────────────────

fn put<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) -> Result<()> {
    if let Some(v) = value {
        map.insert(key.to_owned(), serde_json::to_value(v)?);
    }
    Ok(())
}

fn nest(root: &mut Map<String, Value>, key: &str, child: Map<String, Value>) {
    if !child.is_empty() {
        root.insert(key.to_owned(), Value::Object(child));
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}
