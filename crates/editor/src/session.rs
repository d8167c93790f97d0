//! The editing session: one agent, one store, one backend.
//!
//! `EditorSession` is the only thing a front end talks to. It hydrates the
//! record from the backend, routes panel edits through the reconcilers,
//! feeds LLM changes to the auto-saver and runs the publish flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use callie_client::{wire, AgentApi, PhoneAssignmentUpdate, VoiceAgentDto};
use callie_domain::agent::{AgentRecord, Mutation, VersionMetadata, VersionMutation};
use callie_domain::config::AutosaveConfig;
use callie_domain::error::{Error, Result};
use callie_domain::trace::TraceEvent;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::autosave::{AutoSaver, SaveStatus};
use crate::phones::plan_assignments;
use crate::projection::Views;
use crate::reconcile::{
    self, AudioChange, CallSettingsChange, FunctionsChange, IdentityChange, LlmChange,
    PostCallChange,
};
use crate::store::{Action, AgentStore};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient, user-visible message (toast).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Input of the launch dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishRequest {
    pub version_name: String,
    pub description: String,
    /// Number to route inbound calls to this agent, if any.
    pub inbound: Option<String>,
    /// Number this agent places outbound calls from, if any.
    pub outbound: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub record: Arc<AgentRecord>,
    pub phone_updates: Vec<PhoneAssignmentUpdate>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct EditorSession {
    api: Arc<dyn AgentApi>,
    store: Mutex<AgentStore>,
    /// Set once a record has been loaded; edits before that never save.
    loaded: AtomicBool,
    autosaver: Option<AutoSaver>,
    save_gate: Arc<tokio::sync::Mutex<()>>,
    notifications: Mutex<Vec<Notification>>,
}

impl EditorSession {
    /// Create a session over the default record. When auto-save is enabled
    /// this spawns its task, so it must run inside a tokio runtime.
    pub fn new(api: Arc<dyn AgentApi>, autosave: &AutosaveConfig) -> Self {
        let save_gate = Arc::new(tokio::sync::Mutex::new(()));
        let autosaver = autosave
            .enabled
            .then(|| AutoSaver::spawn(Arc::clone(&api), autosave, Arc::clone(&save_gate)));

        Self {
            api,
            store: Mutex::new(AgentStore::default()),
            loaded: AtomicBool::new(false),
            autosaver,
            save_gate,
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn record(&self) -> Arc<AgentRecord> {
        self.store.lock().state()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn views(&self) -> Arc<Views> {
        self.store.lock().views()
    }

    // ── hydration ───────────────────────────────────────────────────

    /// Fetch an agent (and its LLM) and replace the record with it.
    ///
    /// On failure the record is left as it was and an error notification
    /// is queued.
    pub async fn load_agent(&self, agent_id: &str) -> Result<Arc<AgentRecord>> {
        let loaded = match self.api.fetch_agent(agent_id).await {
            Ok(shell) => self.hydrate_shell(shell).await,
            Err(e) => Err(e),
        };
        self.finish_load(loaded, "Could not load agent")
    }

    /// Instantiate a template server-side and load the resulting agent.
    pub async fn create_from_template(&self, template_id: &str) -> Result<Arc<AgentRecord>> {
        let loaded = match self.api.create_from_template(template_id).await {
            Ok(shell) => self.hydrate_shell(shell).await,
            Err(e) => Err(e),
        };
        self.finish_load(loaded, "Could not create agent from template")
    }

    async fn hydrate_shell(&self, shell: VoiceAgentDto) -> Result<AgentRecord> {
        let llm = match shell.llm_id() {
            Some(llm_id) => Some(self.api.fetch_llm(llm_id).await?),
            None => None,
        };
        wire::hydrate(&shell, llm)
    }

    fn finish_load(&self, loaded: Result<AgentRecord>, context: &str) -> Result<Arc<AgentRecord>> {
        let record = match loaded {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "{context}");
                self.notify(NotificationLevel::Error, format!("{context}: {e}"));
                return Err(e);
            }
        };

        TraceEvent::AgentHydrated {
            agent_id: record.agent_id.clone(),
            llm_id: (!record.llm.llm_id.is_empty()).then(|| record.llm.llm_id.clone()),
            tool_count: record.llm.general_tools.len(),
        }
        .emit();
        TraceEvent::RecordReplaced {
            agent_id: record.agent_id.clone(),
        }
        .emit();

        Ok(self.dispatch(Action::Load(record)))
    }

    // ── editing ─────────────────────────────────────────────────────

    /// Single entry point for every change to the record.
    ///
    /// Once loaded, any action that changes the LLM subtree schedules an
    /// auto-save of the new subtree. `Load` never does.
    pub fn dispatch(&self, action: Action) -> Arc<AgentRecord> {
        self.update(|_| Some(action))
    }

    /// Apply a dotted-path edit such as `ttsConfig.settings.volume`.
    pub fn set_path(&self, path: &str, value: serde_json::Value) -> Result<Arc<AgentRecord>> {
        let mutation = Mutation::from_path(path, value)?;
        Ok(self.dispatch(Action::Set(mutation)))
    }

    pub fn apply_identity(&self, change: IdentityChange) -> Arc<AgentRecord> {
        self.reconcile(|rec| reconcile::identity(rec, change))
    }

    pub fn apply_llm(&self, change: LlmChange) -> Arc<AgentRecord> {
        self.reconcile(|rec| reconcile::llm(rec, change))
    }

    pub fn apply_audio(&self, change: AudioChange) -> Arc<AgentRecord> {
        self.reconcile(|rec| reconcile::audio(rec, change))
    }

    pub fn apply_call_settings(&self, change: CallSettingsChange) -> Arc<AgentRecord> {
        self.reconcile(|rec| reconcile::call_settings(rec, change))
    }

    pub fn apply_post_call(&self, change: PostCallChange) -> Arc<AgentRecord> {
        self.reconcile(|rec| reconcile::post_call(rec, change))
    }

    pub fn apply_functions(&self, change: FunctionsChange) -> Arc<AgentRecord> {
        self.reconcile(|rec| reconcile::functions(rec, change))
    }

    fn reconcile(&self, f: impl FnOnce(&AgentRecord) -> Vec<Mutation>) -> Arc<AgentRecord> {
        self.update(|rec| {
            let mutations = f(rec);
            (!mutations.is_empty()).then_some(Action::Batch(mutations))
        })
    }

    fn update(&self, f: impl FnOnce(&AgentRecord) -> Option<Action>) -> Arc<AgentRecord> {
        let mut store = self.store.lock();
        let prev = store.state();
        let Some(action) = f(&prev) else {
            return prev;
        };
        let is_load = matches!(action, Action::Load(_));
        let next = store.dispatch(action);

        // Scheduled under the store lock so the saver sees snapshots in
        // commit order.
        if is_load {
            self.loaded.store(true, Ordering::Release);
        } else if self.is_loaded() && prev.llm != next.llm {
            if let Some(saver) = &self.autosaver {
                saver.schedule(next.llm.clone());
            }
        }
        drop(store);
        next
    }

    // ── persistence ─────────────────────────────────────────────────

    /// Save the LLM subtree, publish the full agent and reassign phone
    /// numbers. `versionMetadata` is only updated once all of that worked.
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishOutcome> {
        match self.try_publish(&request).await {
            Ok(outcome) => {
                self.notify(
                    NotificationLevel::Info,
                    format!("Published {}", request.version_name),
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "publish failed");
                self.notify(NotificationLevel::Error, format!("Publish failed: {e}"));
                Err(e)
            }
        }
    }

    async fn try_publish(&self, request: &PublishRequest) -> Result<PublishOutcome> {
        let current = self.record();
        if current.agent_id.is_empty() {
            return Err(Error::Other("no agent loaded".into()));
        }

        let _gate = self.save_gate.lock().await;

        if !current.llm.llm_id.is_empty() {
            self.api.save_llm(&current.llm).await?;
        }

        let meta = VersionMetadata {
            version_name: request.version_name.clone(),
            version_description: request.description.clone(),
            is_published: true,
            last_modification_timestamp: Utc::now().timestamp_millis(),
            inbound_assigned: request.inbound.is_some(),
            outbound_assigned: request.outbound.is_some(),
            ..current.version_metadata.clone()
        };
        let mut prospective = AgentRecord::clone(&current);
        prospective.version_metadata = meta.clone();

        let payload = wire::publish_payload(&prospective)?;
        self.api.publish_agent(&current.agent_id, &payload).await?;

        let phones = self.api.list_phone_numbers().await?;
        let updates = plan_assignments(
            &phones,
            &current.agent_id,
            request.inbound.as_deref(),
            request.outbound.as_deref(),
        );
        for update in &updates {
            self.api.update_phone_number(update).await?;
            TraceEvent::PhoneAssignmentUpdated {
                phone_number: update.phone_number.clone(),
                inbound_agent_id: update.inbound_agent_id.clone(),
                outbound_agent_id: update.outbound_agent_id.clone(),
            }
            .emit();
        }

        let record = self.dispatch(Action::Set(VersionMutation::Replace(meta).into()));
        TraceEvent::AgentPublished {
            agent_id: current.agent_id.clone(),
            version_name: request.version_name.clone(),
            phone_updates: updates.len(),
        }
        .emit();

        Ok(PublishOutcome {
            record,
            phone_updates: updates,
        })
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosaver
            .as_ref()
            .map(AutoSaver::status)
            .unwrap_or_default()
    }

    /// Send any pending auto-save now and wait for it.
    pub async fn flush_autosave(&self) {
        if let Some(saver) = &self.autosaver {
            saver.flush().await;
        }
    }

    /// Stop the auto-save timer. Unsaved LLM edits are dropped; call
    /// [`flush_autosave`](Self::flush_autosave) first to keep them.
    pub fn shutdown(&self) {
        if let Some(saver) = &self.autosaver {
            saver.cancel();
        }
    }

    // ── notifications ───────────────────────────────────────────────

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }

    fn notify(&self, level: NotificationLevel, message: String) {
        self.notifications.lock().push(Notification {
            level,
            message,
            at: Utc::now(),
        });
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("agent_id", &self.record().agent_id)
            .field("loaded", &self.is_loaded())
            .field("autosaver", &self.autosaver)
            .finish()
    }
}
