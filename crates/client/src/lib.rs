//! `callie-client`: backend client for the Callie agent dashboard.
//!
//! Provides the [`AgentApi`] trait that abstracts over the dashboard
//! backend, a production REST implementation ([`RestAgentClient`]) with
//! retry and silent token refresh, typed wire DTOs, and the mapping
//! between the wire shape and the canonical
//! [`AgentRecord`](callie_domain::agent::AgentRecord) in [`wire`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use callie_client::{wire, AgentApi, RestAgentClient};
//! use callie_domain::config::ApiConfig;
//!
//! # async fn example() -> callie_domain::error::Result<()> {
//! let client = RestAgentClient::new(&ApiConfig::default())?;
//!
//! let shell = client.fetch_agent("agent-123").await?;
//! let llm = match shell.llm_id() {
//!     Some(id) => Some(client.fetch_llm(id).await?),
//!     None => None,
//! };
//! let record = wire::hydrate(&shell, llm)?;
//! println!("{} has {} tools", record.agent_name, record.llm.general_tools.len());
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod rest;
pub mod types;
pub mod wire;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use provider::AgentApi;
pub use rest::{from_reqwest, RestAgentClient, SessionEvent};
pub use types::{
    AnalysisFieldDto, AnalysisFieldType, EngineType, PhoneAssignmentUpdate, PhoneNumberDto,
    RefreshResponse, ResponseEngineRef, TemplateDto, VoiceAgentDto, VoicemailActionDto,
    VoicemailOptionDto,
};
