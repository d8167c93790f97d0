use callie_domain::agent::AgentRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmView {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub kb_top_k: u32,
    pub kb_filter_score: f64,
    pub knowledge_base: Vec<KnowledgeBaseItem>,
}

/// Placeholder descriptor for an attached knowledge base. The record only
/// stores ids, so everything else is synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl KnowledgeBaseItem {
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: id.to_owned(),
            kind: "pdf".into(),
            status: "ready".into(),
        }
    }
}

impl LlmView {
    pub fn derive(rec: &AgentRecord) -> Self {
        let llm = &rec.llm;
        Self {
            provider: llm.provider.clone(),
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            top_k: llm.top_k,
            kb_top_k: llm.kb_config.top_k,
            kb_filter_score: llm.kb_config.filter_score,
            knowledge_base: llm
                .kb_config
                .knowledge_base_ids
                .iter()
                .map(|id| KnowledgeBaseItem::placeholder(id))
                .collect(),
        }
    }
}
