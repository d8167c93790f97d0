use callie_domain::agent::AgentRecord;
use serde::Serialize;

/// Name and prompt, the first panel of the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    pub name: String,
    /// The LLM's general prompt.
    pub description: String,
}

impl IdentityView {
    pub fn derive(rec: &AgentRecord) -> Self {
        Self {
            name: rec.agent_name.clone(),
            description: rec.llm.general_prompt.clone(),
        }
    }
}
