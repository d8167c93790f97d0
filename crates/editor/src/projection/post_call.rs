use callie_domain::agent::{AgentRecord, ExtractionItem};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCallView {
    pub extraction_items: Vec<ExtractionItem>,
    pub webhook_enabled: bool,
    pub webhook_url: String,
    /// Seconds.
    pub webhook_timeout: u32,
}

impl PostCallView {
    pub fn derive(rec: &AgentRecord) -> Self {
        let pc = &rec.post_call_analysis;
        Self {
            // Upstream does not populate these flags reliably.
            extraction_items: pc
                .extraction_items
                .iter()
                .map(|item| ExtractionItem {
                    enabled: true,
                    is_optional: false,
                    ..item.clone()
                })
                .collect(),
            webhook_enabled: pc.webhook_enabled,
            webhook_url: pc.webhook_url.clone(),
            webhook_timeout: pc.webhook_timeout,
        }
    }
}
