use callie_domain::agent::{AgentRecord, GreetingType, StartSpeaker, VoicemailAction};
use serde::Serialize;

/// Call-flow settings in slider units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSettingsView {
    pub welcome_message: String,
    pub first_speaker: StartSpeaker,
    pub user_greeting_type: GreetingType,
    pub wait_duration_ms: u64,

    /// Derived from `reEngageAttempts > 0`; there is no stored flag.
    pub re_engage_enabled: bool,
    pub re_engage_message: String,
    pub re_engage_attempts: u32,
    pub ivr_hangup_enabled: bool,

    pub voicemail_detection_enabled: bool,
    pub voicemail_action: VoicemailAction,
    pub voicemail_message: String,

    /// Seconds.
    pub no_response_time: f64,
    /// Minutes.
    pub max_call_duration: f64,
    /// Seconds.
    pub max_ring_duration: f64,
}

pub(crate) const MS_PER_SECOND: f64 = 1_000.0;
pub(crate) const MS_PER_MINUTE: f64 = 60_000.0;

impl CallSettingsView {
    pub fn derive(rec: &AgentRecord) -> Self {
        let vm = &rec.voicemail_detection;
        Self {
            welcome_message: rec.llm.begin_message.clone(),
            first_speaker: rec.llm.start_speaker,
            user_greeting_type: rec.user_greeting_type,
            wait_duration_ms: rec.wait_duration_ms,
            re_engage_enabled: rec.re_engage_attempts > 0,
            re_engage_message: rec.re_engage_message.clone(),
            re_engage_attempts: rec.re_engage_attempts,
            ivr_hangup_enabled: rec.ivr_hangup,
            voicemail_detection_enabled: vm.enabled,
            voicemail_action: vm.action,
            voicemail_message: vm.message.clone(),
            no_response_time: rec.no_response_timeout_ms as f64 / MS_PER_SECOND,
            max_call_duration: rec.max_call_duration_ms as f64 / MS_PER_MINUTE,
            max_ring_duration: rec.ring_timeout_ms as f64 / MS_PER_SECOND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_millis_become_slider_units() {
        let view = CallSettingsView::derive(&AgentRecord::default());
        assert_eq!(view.no_response_time, 15.0);
        assert_eq!(view.max_call_duration, 10.0);
        assert_eq!(view.max_ring_duration, 30.0);
        assert!(view.re_engage_enabled);
    }

    #[test]
    fn zero_attempts_reads_as_disabled() {
        let mut rec = AgentRecord::default();
        rec.re_engage_attempts = 0;
        assert!(!CallSettingsView::derive(&rec).re_engage_enabled);
    }
}
