//! The `AgentApi` trait defines the interface for every dashboard backend
//! (REST, in-memory test doubles).

use async_trait::async_trait;
use callie_domain::agent::LlmConfig;
use callie_domain::error::Result;

use crate::types::{PhoneAssignmentUpdate, PhoneNumberDto, TemplateDto, VoiceAgentDto};

/// Abstraction over the dashboard backend API surface.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Fetch an agent shell by id (GET /api/v1/get-voice-agent/{id}).
    async fn fetch_agent(&self, agent_id: &str) -> Result<VoiceAgentDto>;

    /// Fetch the LLM sub-resource as raw JSON (GET /api/v1/get-reacherr-llm/{id}).
    ///
    /// Raw so hydration can overlay only the keys the backend actually sent.
    async fn fetch_llm(&self, llm_id: &str) -> Result<serde_json::Value>;

    /// Instantiate a template server-side (POST /api/v1/create-agent-from-template/{id}).
    async fn create_from_template(&self, template_id: &str) -> Result<VoiceAgentDto>;

    /// List available templates (GET /api/v1/templates).
    async fn list_templates(&self) -> Result<Vec<TemplateDto>>;

    /// Save the LLM subtree keyed by its `llmId` (PATCH /api/v1/update-reacherr-llm/{llmId}).
    async fn save_llm(&self, llm: &LlmConfig) -> Result<()>;

    /// Save the full agent payload (PATCH /api/v1/publish-voice-agent/{agentId}).
    async fn publish_agent(&self, agent_id: &str, payload: &VoiceAgentDto) -> Result<()>;

    /// List the account's phone numbers (POST /api/v1/list-phone-number).
    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumberDto>>;

    /// Change a number's agent assignment (POST /api/v1/update-phone-number/{number}).
    async fn update_phone_number(&self, update: &PhoneAssignmentUpdate) -> Result<()>;
}
