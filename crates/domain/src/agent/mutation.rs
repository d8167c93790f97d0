use super::record::*;
use super::tool::ToolEntry;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Typed mutations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single write to one leaf (or one list slot) of an [`AgentRecord`].
///
/// Applying a mutation never fails. Missing optional sub-objects are
/// created with defaults and indexed writes past the end append.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AgentId(String),
    AgentName(String),
    Channel(String),
    Language(String),
    MaxCallDurationMs(u64),
    RingTimeoutMs(u64),
    NoResponseTimeoutMs(u64),
    WaitDurationMs(u64),
    IvrHangup(bool),
    ReEngageAttempts(u32),
    ReEngageMessage(String),
    UserGreetingType(GreetingType),
    Tts(TtsMutation),
    Stt(SttMutation),
    Llm(LlmMutation),
    PostCall(PostCallMutation),
    Voicemail(VoicemailMutation),
    Version(VersionMutation),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TtsMutation {
    Provider(String),
    Model(String),
    VoiceId(String),
    Settings(TtsSettings),
    Speed(f64),
    Volume(f64),
    Stability(f64),
    SimilarityBoost(f64),
    StyleExaggeration(f64),
    Pitch(f64),
    Temperature(f64),
    Voice(Option<VoiceDescriptor>),
    VoiceField(VoiceField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceField {
    VoiceId(String),
    DisplayName(String),
    Gender(String),
    Provider(String),
    Accent(String),
    PreviewUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SttMutation {
    Provider(String),
    Model(String),
    Keywords(Vec<String>),
    Keyword(usize, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LlmMutation {
    Replace(LlmConfig),
    LlmId(String),
    Provider(String),
    Model(String),
    MaxTokens(u32),
    Temperature(f64),
    TopK(u32),
    GeneralPrompt(String),
    BeginMessage(String),
    StartSpeaker(StartSpeaker),
    ModelHighPriority(bool),
    ToolCallStrictMode(bool),
    KbTopK(u32),
    KbFilterScore(f64),
    KnowledgeBaseIds(Vec<String>),
    KnowledgeBaseId(usize, String),
    GeneralTools(Vec<ToolEntry>),
    /// Past the end appends.
    GeneralTool(usize, ToolEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCallMutation {
    WebhookEnabled(bool),
    WebhookUrl(String),
    WebhookTimeout(u32),
    ExtractionItems(Vec<ExtractionItem>),
    ExtractionItem(usize, ExtractionItem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoicemailMutation {
    Enabled(bool),
    Action(VoicemailAction),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionMutation {
    Replace(VersionMetadata),
    Version(u32),
    VersionName(String),
    VersionDescription(String),
    IsPublished(bool),
    LastModificationTimestamp(i64),
    InboundAssigned(bool),
    OutboundAssigned(bool),
}

impl Mutation {
    pub fn apply(self, rec: &mut AgentRecord) {
        match self {
            Mutation::AgentId(v) => rec.agent_id = v,
            Mutation::AgentName(v) => rec.agent_name = v,
            Mutation::Channel(v) => rec.channel = v,
            Mutation::Language(v) => rec.language = v,
            Mutation::MaxCallDurationMs(v) => rec.max_call_duration_ms = v,
            Mutation::RingTimeoutMs(v) => rec.ring_timeout_ms = v,
            Mutation::NoResponseTimeoutMs(v) => rec.no_response_timeout_ms = v,
            Mutation::WaitDurationMs(v) => rec.wait_duration_ms = v,
            Mutation::IvrHangup(v) => rec.ivr_hangup = v,
            Mutation::ReEngageAttempts(v) => rec.re_engage_attempts = v,
            Mutation::ReEngageMessage(v) => rec.re_engage_message = v,
            Mutation::UserGreetingType(v) => rec.user_greeting_type = v,
            Mutation::Tts(m) => m.apply(&mut rec.tts_config),
            Mutation::Stt(m) => m.apply(&mut rec.stt_config),
            Mutation::Llm(m) => m.apply(&mut rec.llm),
            Mutation::PostCall(m) => m.apply(&mut rec.post_call_analysis),
            Mutation::Voicemail(m) => m.apply(&mut rec.voicemail_detection),
            Mutation::Version(m) => m.apply(&mut rec.version_metadata),
        }
    }

    /// Whether this write lands inside `reacherrLlmData`.
    pub fn touches_llm(&self) -> bool {
        matches!(self, Mutation::Llm(_))
    }
}

impl TtsMutation {
    fn apply(self, tts: &mut TtsConfig) {
        match self {
            TtsMutation::Provider(v) => tts.provider = v,
            TtsMutation::Model(v) => tts.model = v,
            TtsMutation::VoiceId(v) => tts.voice_id = v,
            TtsMutation::Settings(v) => tts.settings = v,
            TtsMutation::Speed(v) => tts.settings.speed = v,
            TtsMutation::Volume(v) => tts.settings.volume = v,
            TtsMutation::Stability(v) => tts.settings.stability = v,
            TtsMutation::SimilarityBoost(v) => tts.settings.similarity_boost = v,
            TtsMutation::StyleExaggeration(v) => tts.settings.style_exaggeration = v,
            TtsMutation::Pitch(v) => tts.settings.pitch = v,
            TtsMutation::Temperature(v) => tts.settings.temperature = v,
            TtsMutation::Voice(v) => tts.voice = v,
            TtsMutation::VoiceField(field) => {
                let voice = tts.voice.get_or_insert_with(VoiceDescriptor::default);
                match field {
                    VoiceField::VoiceId(v) => voice.voice_id = v,
                    VoiceField::DisplayName(v) => voice.display_name = v,
                    VoiceField::Gender(v) => voice.gender = v,
                    VoiceField::Provider(v) => voice.provider = v,
                    VoiceField::Accent(v) => voice.accent = v,
                    VoiceField::PreviewUrl(v) => voice.preview_url = v,
                }
            }
        }
    }
}

impl SttMutation {
    fn apply(self, stt: &mut SttConfig) {
        match self {
            SttMutation::Provider(v) => stt.provider = v,
            SttMutation::Model(v) => stt.model = v,
            SttMutation::Keywords(v) => stt.settings.keywords = v,
            SttMutation::Keyword(i, v) => set_or_push(&mut stt.settings.keywords, i, v),
        }
    }
}

impl LlmMutation {
    fn apply(self, llm: &mut LlmConfig) {
        match self {
            LlmMutation::Replace(v) => *llm = v,
            LlmMutation::LlmId(v) => llm.llm_id = v,
            LlmMutation::Provider(v) => llm.provider = v,
            LlmMutation::Model(v) => llm.model = v,
            LlmMutation::MaxTokens(v) => llm.max_tokens = v,
            LlmMutation::Temperature(v) => llm.temperature = v,
            LlmMutation::TopK(v) => llm.top_k = v,
            LlmMutation::GeneralPrompt(v) => llm.general_prompt = v,
            LlmMutation::BeginMessage(v) => llm.begin_message = v,
            LlmMutation::StartSpeaker(v) => llm.start_speaker = v,
            LlmMutation::ModelHighPriority(v) => llm.model_high_priority = v,
            LlmMutation::ToolCallStrictMode(v) => llm.tool_call_strict_mode = v,
            LlmMutation::KbTopK(v) => llm.kb_config.top_k = v,
            LlmMutation::KbFilterScore(v) => llm.kb_config.filter_score = v,
            LlmMutation::KnowledgeBaseIds(v) => llm.kb_config.knowledge_base_ids = v,
            LlmMutation::KnowledgeBaseId(i, v) => {
                set_or_push(&mut llm.kb_config.knowledge_base_ids, i, v)
            }
            LlmMutation::GeneralTools(v) => llm.general_tools = v,
            LlmMutation::GeneralTool(i, v) => set_or_push(&mut llm.general_tools, i, v),
        }
    }
}

impl PostCallMutation {
    fn apply(self, pc: &mut PostCallAnalysis) {
        match self {
            PostCallMutation::WebhookEnabled(v) => pc.webhook_enabled = v,
            PostCallMutation::WebhookUrl(v) => pc.webhook_url = v,
            PostCallMutation::WebhookTimeout(v) => pc.webhook_timeout = v,
            PostCallMutation::ExtractionItems(v) => pc.extraction_items = v,
            PostCallMutation::ExtractionItem(i, v) => set_or_push(&mut pc.extraction_items, i, v),
        }
    }
}

impl VoicemailMutation {
    fn apply(self, vm: &mut VoicemailDetection) {
        match self {
            VoicemailMutation::Enabled(v) => vm.enabled = v,
            VoicemailMutation::Action(v) => vm.action = v,
            VoicemailMutation::Message(v) => vm.message = v,
        }
    }
}

impl VersionMutation {
    fn apply(self, meta: &mut VersionMetadata) {
        match self {
            VersionMutation::Replace(v) => *meta = v,
            VersionMutation::Version(v) => meta.version = v,
            VersionMutation::VersionName(v) => meta.version_name = v,
            VersionMutation::VersionDescription(v) => meta.version_description = v,
            VersionMutation::IsPublished(v) => meta.is_published = v,
            VersionMutation::LastModificationTimestamp(v) => meta.last_modification_timestamp = v,
            VersionMutation::InboundAssigned(v) => meta.inbound_assigned = v,
            VersionMutation::OutboundAssigned(v) => meta.outbound_assigned = v,
        }
    }
}

// ── helpers ─────────────────────────────────────────────────────────

/// Overwrite `list[index]`, or append when `index` is past the end.
fn set_or_push<T>(list: &mut Vec<T>, index: usize, value: T) {
    match list.get_mut(index) {
        Some(slot) => *slot = value,
        None => list.push(value),
    }
}

// ── conversions ─────────────────────────────────────────────────────

impl From<TtsMutation> for Mutation {
    fn from(m: TtsMutation) -> Self {
        Mutation::Tts(m)
    }
}

impl From<SttMutation> for Mutation {
    fn from(m: SttMutation) -> Self {
        Mutation::Stt(m)
    }
}

impl From<LlmMutation> for Mutation {
    fn from(m: LlmMutation) -> Self {
        Mutation::Llm(m)
    }
}

impl From<PostCallMutation> for Mutation {
    fn from(m: PostCallMutation) -> Self {
        Mutation::PostCall(m)
    }
}

impl From<VoicemailMutation> for Mutation {
    fn from(m: VoicemailMutation) -> Self {
        Mutation::Voicemail(m)
    }
}

impl From<VersionMutation> for Mutation {
    fn from(m: VersionMutation) -> Self {
        Mutation::Version(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{EndCallTool, Tool};

    #[test]
    fn voice_field_creates_missing_descriptor() {
        let mut rec = AgentRecord::default();
        assert!(rec.tts_config.voice.is_none());

        Mutation::Tts(TtsMutation::VoiceField(VoiceField::DisplayName("Ava".into())))
            .apply(&mut rec);

        let voice = rec.tts_config.voice.unwrap();
        assert_eq!(voice.display_name, "Ava");
        assert_eq!(voice.voice_id, "");
    }

    #[test]
    fn indexed_write_past_end_appends() {
        let mut rec = AgentRecord::default();
        Mutation::Stt(SttMutation::Keyword(2, "Acme".into())).apply(&mut rec);
        assert_eq!(rec.stt_config.settings.keywords, vec!["Acme"]);
        Mutation::Stt(SttMutation::Keyword(0, "Globex".into())).apply(&mut rec);
        assert_eq!(rec.stt_config.settings.keywords, vec!["Globex"]);

        Mutation::PostCall(PostCallMutation::ExtractionItem(
            1,
            ExtractionItem {
                name: "budget".into(),
                ..Default::default()
            },
        ))
        .apply(&mut rec);
        assert_eq!(rec.post_call_analysis.extraction_items.len(), 1);
        assert_eq!(rec.post_call_analysis.extraction_items[0].name, "budget");
    }

    #[test]
    fn huge_index_from_path_appends_without_allocating() {
        for path in [
            "sttConfig.settings.keywords[18446744073709551615]",
            "sttConfig.settings.keywords[1000000000000]",
        ] {
            let mut rec = AgentRecord::default();
            Mutation::from_path(path, serde_json::json!("Acme"))
                .unwrap()
                .apply(&mut rec);
            assert_eq!(rec.stt_config.settings.keywords, vec!["Acme"], "{path}");
        }
    }

    #[test]
    fn general_tool_past_end_appends() {
        let mut rec = AgentRecord::default();
        let end_call: ToolEntry = Tool::EndCall(EndCallTool {
            name: "end_call".into(),
            description: String::new(),
        })
        .into();
        Mutation::Llm(LlmMutation::GeneralTool(5, end_call.clone())).apply(&mut rec);
        assert_eq!(rec.llm.general_tools, vec![end_call]);
    }

    #[test]
    fn only_llm_writes_touch_llm() {
        assert!(Mutation::from(LlmMutation::TopK(5)).touches_llm());
        assert!(!Mutation::AgentName("x".into()).touches_llm());
    }
}
