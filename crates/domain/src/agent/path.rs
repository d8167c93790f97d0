//! Dotted/bracketed path syntax (`reacherrLlmData.kbConfig.knowledgeBaseIds[0]`)
//! for callers that only have a path string, such as the CLI.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::mutation::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seg<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse(path: &str) -> Result<Vec<Seg<'_>>> {
    if path.trim().is_empty() {
        return Err(Error::invalid_path(path, "empty path"));
    }
    let mut segs = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };
        if !key.is_empty() {
            match key.parse::<usize>() {
                Ok(i) => segs.push(Seg::Index(i)),
                Err(_) => segs.push(Seg::Key(key)),
            }
        } else if rest.is_empty() {
            return Err(Error::invalid_path(path, "empty segment"));
        }
        while !rest.is_empty() {
            let close = rest
                .find(']')
                .filter(|_| rest.starts_with('['))
                .ok_or_else(|| Error::invalid_path(path, "unbalanced brackets"))?;
            let index = rest[1..close]
                .parse::<usize>()
                .map_err(|_| Error::invalid_path(path, "index must be a non-negative integer"))?;
            segs.push(Seg::Index(index));
            rest = &rest[close + 1..];
        }
    }
    Ok(segs)
}

fn take<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::invalid_path(path, e.to_string()))
}

impl Mutation {
    /// Build a mutation from a path string and a JSON value.
    ///
    /// Fails with [`Error::InvalidPath`] when the path does not name a leaf
    /// of the record or the value does not fit the leaf's type.
    pub fn from_path(path: &str, v: Value) -> Result<Self> {
        use Seg::{Index, Key};

        let segs = parse(path)?;
        let m = match segs.as_slice() {
            [Key("agentId")] => Mutation::AgentId(take(path, v)?),
            [Key("agentName")] => Mutation::AgentName(take(path, v)?),
            [Key("channel")] => Mutation::Channel(take(path, v)?),
            [Key("language")] => Mutation::Language(take(path, v)?),
            [Key("maxCallDurationMs")] => Mutation::MaxCallDurationMs(take(path, v)?),
            [Key("ringTimeOutMs")] => Mutation::RingTimeoutMs(take(path, v)?),
            [Key("noResponseTimeoutMs")] => Mutation::NoResponseTimeoutMs(take(path, v)?),
            [Key("waitDurationMs")] => Mutation::WaitDurationMs(take(path, v)?),
            [Key("ivrHangup")] => Mutation::IvrHangup(take(path, v)?),
            [Key("reEngageAttempts")] => Mutation::ReEngageAttempts(take(path, v)?),
            [Key("reEngageMessage")] => Mutation::ReEngageMessage(take(path, v)?),
            [Key("userGreetingType")] => Mutation::UserGreetingType(take(path, v)?),

            [Key("ttsConfig"), rest @ ..] => Mutation::Tts(tts(path, rest, v)?),
            [Key("sttConfig"), rest @ ..] => Mutation::Stt(stt(path, rest, v)?),
            [Key("reacherrLlmData"), rest @ ..] => Mutation::Llm(llm(path, rest, v)?),
            [Key("postCallAnalysis"), rest @ ..] => Mutation::PostCall(post_call(path, rest, v)?),
            [Key("voicemailDetection"), rest @ ..] => {
                Mutation::Voicemail(voicemail(path, rest, v)?)
            }
            [Key("versionMetadata"), rest @ ..] => Mutation::Version(version(path, rest, v)?),
            [Index(_), ..] => return Err(Error::invalid_path(path, "record root is not a list")),
            _ => return Err(Error::invalid_path(path, "unknown field")),
        };
        Ok(m)
    }
}

fn unknown(path: &str) -> Error {
    Error::invalid_path(path, "unknown field")
}

fn tts(path: &str, segs: &[Seg<'_>], v: Value) -> Result<TtsMutation> {
    use Seg::Key;
    Ok(match segs {
        [Key("provider")] => TtsMutation::Provider(take(path, v)?),
        [Key("model")] => TtsMutation::Model(take(path, v)?),
        [Key("voiceId")] => TtsMutation::VoiceId(take(path, v)?),
        [Key("settings")] => TtsMutation::Settings(take(path, v)?),
        [Key("settings"), Key("speed" | "voiceSpeed")] => TtsMutation::Speed(take(path, v)?),
        [Key("settings"), Key("volume")] => TtsMutation::Volume(take(path, v)?),
        [Key("settings"), Key("stability")] => TtsMutation::Stability(take(path, v)?),
        [Key("settings"), Key("similarityBoost")] => TtsMutation::SimilarityBoost(take(path, v)?),
        [Key("settings"), Key("styleExaggeration")] => {
            TtsMutation::StyleExaggeration(take(path, v)?)
        }
        [Key("settings"), Key("pitch")] => TtsMutation::Pitch(take(path, v)?),
        [Key("settings"), Key("temperature" | "voiceTemperature")] => {
            TtsMutation::Temperature(take(path, v)?)
        }
        [Key("voice")] => TtsMutation::Voice(take(path, v)?),
        [Key("voice"), Key(field)] => {
            let s: String = take(path, v)?;
            TtsMutation::VoiceField(match *field {
                "voiceId" => VoiceField::VoiceId(s),
                "displayName" => VoiceField::DisplayName(s),
                "gender" => VoiceField::Gender(s),
                "provider" => VoiceField::Provider(s),
                "accent" => VoiceField::Accent(s),
                "previewUrl" => VoiceField::PreviewUrl(s),
                _ => return Err(unknown(path)),
            })
        }
        _ => return Err(unknown(path)),
    })
}

fn stt(path: &str, segs: &[Seg<'_>], v: Value) -> Result<SttMutation> {
    use Seg::{Index, Key};
    Ok(match segs {
        [Key("provider")] => SttMutation::Provider(take(path, v)?),
        [Key("model")] => SttMutation::Model(take(path, v)?),
        [Key("settings"), Key("keywords")] => SttMutation::Keywords(take(path, v)?),
        [Key("settings"), Key("keywords"), Index(i)] => SttMutation::Keyword(*i, take(path, v)?),
        _ => return Err(unknown(path)),
    })
}

fn llm(path: &str, segs: &[Seg<'_>], v: Value) -> Result<LlmMutation> {
    use Seg::{Index, Key};
    Ok(match segs {
        [] => LlmMutation::Replace(take(path, v)?),
        [Key("llmId")] => LlmMutation::LlmId(take(path, v)?),
        [Key("provider")] => LlmMutation::Provider(take(path, v)?),
        [Key("model")] => LlmMutation::Model(take(path, v)?),
        [Key("maxTokens")] => LlmMutation::MaxTokens(take(path, v)?),
        [Key("temperature")] => LlmMutation::Temperature(take(path, v)?),
        [Key("topK")] => LlmMutation::TopK(take(path, v)?),
        [Key("generalPrompt")] => LlmMutation::GeneralPrompt(take(path, v)?),
        [Key("beginMessage")] => LlmMutation::BeginMessage(take(path, v)?),
        [Key("startSpeaker")] => LlmMutation::StartSpeaker(take(path, v)?),
        [Key("modelHighPriority")] => LlmMutation::ModelHighPriority(take(path, v)?),
        [Key("toolCallStrictMode")] => LlmMutation::ToolCallStrictMode(take(path, v)?),
        [Key("kbConfig"), Key("topK")] => LlmMutation::KbTopK(take(path, v)?),
        [Key("kbConfig"), Key("filterScore")] => LlmMutation::KbFilterScore(take(path, v)?),
        [Key("kbConfig"), Key("knowledgeBaseIds")] => {
            LlmMutation::KnowledgeBaseIds(take(path, v)?)
        }
        [Key("kbConfig"), Key("knowledgeBaseIds"), Index(i)] => {
            LlmMutation::KnowledgeBaseId(*i, take(path, v)?)
        }
        [Key("generalTools")] => LlmMutation::GeneralTools(take(path, v)?),
        [Key("generalTools"), Index(i)] => LlmMutation::GeneralTool(*i, take(path, v)?),
        _ => return Err(unknown(path)),
    })
}

fn post_call(path: &str, segs: &[Seg<'_>], v: Value) -> Result<PostCallMutation> {
    use Seg::{Index, Key};
    Ok(match segs {
        [Key("webhookEnabled")] => PostCallMutation::WebhookEnabled(take(path, v)?),
        [Key("webhookUrl")] => PostCallMutation::WebhookUrl(take(path, v)?),
        [Key("webhookTimeout")] => PostCallMutation::WebhookTimeout(take(path, v)?),
        [Key("extractionItems")] => PostCallMutation::ExtractionItems(take(path, v)?),
        [Key("extractionItems"), Index(i)] => {
            PostCallMutation::ExtractionItem(*i, take(path, v)?)
        }
        _ => return Err(unknown(path)),
    })
}

fn voicemail(path: &str, segs: &[Seg<'_>], v: Value) -> Result<VoicemailMutation> {
    use Seg::Key;
    Ok(match segs {
        [Key("enabled")] => VoicemailMutation::Enabled(take(path, v)?),
        [Key("action")] => VoicemailMutation::Action(take(path, v)?),
        [Key("message")] => VoicemailMutation::Message(take(path, v)?),
        _ => return Err(unknown(path)),
    })
}

fn version(path: &str, segs: &[Seg<'_>], v: Value) -> Result<VersionMutation> {
    use Seg::Key;
    Ok(match segs {
        [] => VersionMutation::Replace(take(path, v)?),
        [Key("version")] => VersionMutation::Version(take(path, v)?),
        [Key("versionName")] => VersionMutation::VersionName(take(path, v)?),
        [Key("versionDescription")] => VersionMutation::VersionDescription(take(path, v)?),
        [Key("isPublished")] => VersionMutation::IsPublished(take(path, v)?),
        [Key("lastModificationTimestamp")] => {
            VersionMutation::LastModificationTimestamp(take(path, v)?)
        }
        [Key("inboundAssigned")] => VersionMutation::InboundAssigned(take(path, v)?),
        [Key("outboundAssigned")] => VersionMutation::OutboundAssigned(take(path, v)?),
        _ => return Err(unknown(path)),
    })
}
