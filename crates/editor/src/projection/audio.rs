use callie_domain::agent::{AgentRecord, VoiceDescriptor};
use serde::Serialize;

/// TTS and STT flattened into one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioView {
    pub language: String,

    pub stt_provider: String,
    pub stt_model: String,
    /// Comma-joined for the keyword input.
    pub stt_keywords: String,

    pub tts_provider: String,
    pub tts_model: String,
    pub tts_voice_id: String,
    pub voice: Option<VoiceDescriptor>,

    pub speed: f64,
    pub stability: f64,
    pub similarity_boost: f64,
    pub style_exaggeration: f64,
    pub volume: f64,
    pub pitch: f64,
    pub temperature: f64,
}

impl AudioView {
    pub fn derive(rec: &AgentRecord) -> Self {
        let tts = &rec.tts_config;
        let stt = &rec.stt_config;
        Self {
            language: rec.language.clone(),
            stt_provider: stt.provider.clone(),
            stt_model: stt.model.clone(),
            stt_keywords: join_keywords(&stt.settings.keywords),
            tts_provider: tts.provider.clone(),
            tts_model: tts.model.clone(),
            tts_voice_id: tts.voice_id.clone(),
            voice: tts.voice.clone(),
            speed: tts.settings.speed,
            stability: tts.settings.stability,
            similarity_boost: tts.settings.similarity_boost,
            style_exaggeration: tts.settings.style_exaggeration,
            volume: tts.settings.volume,
            pitch: tts.settings.pitch,
            temperature: tts.settings.temperature,
        }
    }
}

pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

/// Inverse of [`join_keywords`]. Blank entries are dropped, order is kept.
pub fn split_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_through_display_string() {
        let keywords = vec!["Acme".to_owned(), "Zyrtec".to_owned(), "HIPAA".to_owned()];
        let shown = join_keywords(&keywords);
        assert_eq!(shown, "Acme, Zyrtec, HIPAA");
        assert_eq!(split_keywords(&shown), keywords);
    }

    #[test]
    fn split_drops_blank_entries() {
        assert_eq!(split_keywords(" a,, b ,"), vec!["a", "b"]);
        assert!(split_keywords("").is_empty());
    }
}
