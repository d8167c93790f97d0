use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Debounced LLM auto-save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    /// Quiet period after the last LLM edit before a save is sent.
    #[serde(default = "d_2000")]
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 2_000,
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn d_true() -> bool {
    true
}
fn d_2000() -> u64 {
    2_000
}
