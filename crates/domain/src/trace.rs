use serde::Serialize;

/// Structured trace events emitted across all Callie crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ApiCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    TokenRefreshed {
        succeeded: bool,
    },
    AgentHydrated {
        agent_id: String,
        llm_id: Option<String>,
        tool_count: usize,
    },
    RecordReplaced {
        agent_id: String,
    },
    AutosaveScheduled {
        llm_id: String,
        debounce_ms: u64,
    },
    AutosaveCompleted {
        llm_id: String,
        duration_ms: u64,
    },
    AutosaveFailed {
        llm_id: String,
        error: String,
    },
    AgentPublished {
        agent_id: String,
        version_name: String,
        phone_updates: usize,
    },
    PhoneAssignmentUpdated {
        phone_number: String,
        inbound_agent_id: Option<String>,
        outbound_agent_id: Option<String>,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "callie_event");
    }
}
