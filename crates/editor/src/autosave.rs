//! Debounced persistence of the LLM subtree.
//!
//! The editor hands every new `reacherrLlmData` snapshot to [`AutoSaver::schedule`].
//! A background task waits for a quiet period and then saves whatever the
//! latest snapshot is at that moment, so a burst of edits costs one request.
//! Failed saves are recorded in [`SaveStatus`] and not retried; the next
//! schedule carries the current state anyway.

use std::sync::Arc;
use std::time::Duration;

use callie_client::AgentApi;
use callie_domain::agent::LlmConfig;
use callie_domain::config::AutosaveConfig;
use callie_domain::trace::TraceEvent;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// UI feedback for the save indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub is_saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Message of the most recent failed save, cleared by the next success.
    pub last_error: Option<String>,
}

enum Command {
    Flush(oneshot::Sender<()>),
}

pub struct AutoSaver {
    pending: watch::Sender<Option<LlmConfig>>,
    commands: mpsc::UnboundedSender<Command>,
    status: Arc<Mutex<SaveStatus>>,
    shutdown: CancellationToken,
    debounce: Duration,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Start the background task. Must be called from within a tokio runtime.
    ///
    /// `gate` is held for the duration of each save so callers doing their
    /// own writes (publish) never interleave with an auto-save.
    pub fn spawn(
        api: Arc<dyn AgentApi>,
        config: &AutosaveConfig,
        gate: Arc<tokio::sync::Mutex<()>>,
    ) -> Self {
        let (pending, rx) = watch::channel(None);
        let (commands, cmd_rx) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(SaveStatus::default()));
        let shutdown = CancellationToken::new();
        let debounce = config.debounce();

        let worker = Worker {
            api,
            gate,
            status: Arc::clone(&status),
            debounce,
        };
        let task = tokio::spawn(worker.run(rx, cmd_rx, shutdown.clone()));

        Self {
            pending,
            commands,
            status,
            shutdown,
            debounce,
            task,
        }
    }

    /// Replace the pending snapshot and restart the quiet-period timer.
    pub fn schedule(&self, llm: LlmConfig) {
        TraceEvent::AutosaveScheduled {
            llm_id: llm.llm_id.clone(),
            debounce_ms: self.debounce.as_millis() as u64,
        }
        .emit();
        self.pending.send_replace(Some(llm));
    }

    /// Save the pending snapshot now, if any, and wait for it to finish.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Flush(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }

    pub fn status(&self) -> SaveStatus {
        self.status.lock().clone()
    }

    /// Stop the timer. A pending snapshot that has not been saved is dropped.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled() || self.task.is_finished()
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaver")
            .field("debounce", &self.debounce)
            .field("status", &*self.status.lock())
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

// ── worker ──────────────────────────────────────────────────────────

struct Worker {
    api: Arc<dyn AgentApi>,
    gate: Arc<tokio::sync::Mutex<()>>,
    status: Arc<Mutex<SaveStatus>>,
    debounce: Duration,
}

impl Worker {
    async fn run(
        self,
        mut rx: watch::Receiver<Option<LlmConfig>>,
        mut commands: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
    ) {
        loop {
            // Idle: everything seen so far has been saved.
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                cmd = commands.recv() => match cmd {
                    Some(Command::Flush(ack)) => {
                        let _ = ack.send(());
                        continue;
                    }
                    None => return,
                },
            }

            // Debouncing: every further change pushes the deadline out.
            let deadline = tokio::time::sleep(self.debounce);
            tokio::pin!(deadline);
            let ack = loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        deadline.as_mut().reset(Instant::now() + self.debounce);
                    }
                    cmd = commands.recv() => match cmd {
                        Some(Command::Flush(ack)) => break Some(ack),
                        None => return,
                    },
                    _ = &mut deadline => break None,
                }
            };

            let snapshot = rx.borrow_and_update().clone();
            if let Some(llm) = snapshot {
                self.save(llm).await;
            }
            if let Some(ack) = ack {
                let _ = ack.send(());
            }
        }
    }

    async fn save(&self, llm: LlmConfig) {
        if llm.llm_id.is_empty() {
            tracing::debug!("skipping auto-save: record has no llm id");
            return;
        }

        let _gate = self.gate.lock().await;
        self.status.lock().is_saving = true;
        let started = Instant::now();
        let result = self.api.save_llm(&llm).await;

        let mut status = self.status.lock();
        status.is_saving = false;
        match result {
            Ok(()) => {
                status.last_saved_at = Some(Utc::now());
                status.last_error = None;
                TraceEvent::AutosaveCompleted {
                    llm_id: llm.llm_id,
                    duration_ms: started.elapsed().as_millis() as u64,
                }
                .emit();
            }
            Err(e) => {
                tracing::warn!(llm_id = %llm.llm_id, error = %e, "auto-save failed");
                status.last_error = Some(e.to_string());
                TraceEvent::AutosaveFailed {
                    llm_id: llm.llm_id,
                    error: e.to_string(),
                }
                .emit();
            }
        }
    }
}
