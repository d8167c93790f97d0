#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use callie_client::{
    AgentApi, PhoneAssignmentUpdate, PhoneNumberDto, ResponseEngineRef, TemplateDto,
    VoiceAgentDto,
};
use callie_domain::agent::LlmConfig;
use callie_domain::error::{Error, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// In-memory backend that records every write.
#[derive(Default)]
pub struct FakeApi {
    pub agents: Mutex<HashMap<String, VoiceAgentDto>>,
    pub templates: Mutex<HashMap<String, VoiceAgentDto>>,
    pub llms: Mutex<HashMap<String, Value>>,
    pub phones: Mutex<Vec<PhoneNumberDto>>,

    pub saved_llms: Mutex<Vec<LlmConfig>>,
    pub published: Mutex<Vec<(String, VoiceAgentDto)>>,
    pub phone_updates: Mutex<Vec<PhoneAssignmentUpdate>>,

    pub fail_save_llm: AtomicBool,
    pub fail_publish: AtomicBool,
}

impl FakeApi {
    /// One agent `agent-1` backed by LLM `llm-1`.
    pub fn with_agent() -> Self {
        let api = Self::default();
        api.agents.lock().insert(
            "agent-1".into(),
            VoiceAgentDto {
                agent_id: Some("agent-1".into()),
                agent_name: Some("Front desk".into()),
                response_engine: Some(ResponseEngineRef::reacherr_llm("llm-1")),
                ..Default::default()
            },
        );
        api.llms.lock().insert(
            "llm-1".into(),
            json!({
                "llmId": "llm-1",
                "generalPrompt": "You answer the phone for a dental clinic.",
                "temperature": 0.2
            }),
        );
        api
    }

    pub fn saved(&self) -> Vec<LlmConfig> {
        self.saved_llms.lock().clone()
    }
}

#[async_trait]
impl AgentApi for FakeApi {
    async fn fetch_agent(&self, agent_id: &str) -> Result<VoiceAgentDto> {
        self.agents
            .lock()
            .get(agent_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("GET /api/v1/get-voice-agent/{agent_id}")))
    }

    async fn fetch_llm(&self, llm_id: &str) -> Result<Value> {
        self.llms
            .lock()
            .get(llm_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("GET /api/v1/get-reacherr-llm/{llm_id}")))
    }

    async fn create_from_template(&self, template_id: &str) -> Result<VoiceAgentDto> {
        self.templates
            .lock()
            .get(template_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("template {template_id}")))
    }

    async fn list_templates(&self) -> Result<Vec<TemplateDto>> {
        Ok(self
            .templates
            .lock()
            .keys()
            .map(|id| TemplateDto {
                id: id.clone(),
                name: id.clone(),
                description: String::new(),
                template_type: None,
            })
            .collect())
    }

    async fn save_llm(&self, llm: &LlmConfig) -> Result<()> {
        if self.fail_save_llm.load(Ordering::SeqCst) {
            return Err(Error::Api {
                endpoint: "PATCH /api/v1/update-reacherr-llm".into(),
                status: 500,
                message: "boom".into(),
            });
        }
        self.saved_llms.lock().push(llm.clone());
        Ok(())
    }

    async fn publish_agent(&self, agent_id: &str, payload: &VoiceAgentDto) -> Result<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(Error::Api {
                endpoint: "PATCH /api/v1/publish-voice-agent".into(),
                status: 422,
                message: "invalid payload".into(),
            });
        }
        self.published
            .lock()
            .push((agent_id.to_owned(), payload.clone()));
        Ok(())
    }

    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumberDto>> {
        Ok(self.phones.lock().clone())
    }

    async fn update_phone_number(&self, update: &PhoneAssignmentUpdate) -> Result<()> {
        let mut phones = self.phones.lock();
        if let Some(p) = phones
            .iter_mut()
            .find(|p| p.phone_number == update.phone_number)
        {
            p.inbound_agent_id = update.inbound_agent_id.clone();
            p.outbound_agent_id = update.outbound_agent_id.clone();
        }
        self.phone_updates.lock().push(update.clone());
        Ok(())
    }
}
