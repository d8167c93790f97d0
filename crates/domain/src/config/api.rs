use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dashboard backend connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_15000")]
    pub timeout_ms: u64,
    /// Retries on 5xx / timeouts. 4xx responses are never retried.
    #[serde(default = "d_2")]
    pub max_retries: u32,
    /// Environment variable holding the bearer access token.
    #[serde(default = "d_access_env")]
    pub access_token_env: String,
    /// Environment variable holding the refresh token used after a 401.
    #[serde(default = "d_refresh_env")]
    pub refresh_token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            timeout_ms: 15_000,
            max_retries: 2,
            access_token_env: d_access_env(),
            refresh_token_env: d_refresh_env(),
        }
    }
}

impl ApiConfig {
    /// Read the access token from the configured environment variable.
    pub fn access_token(&self) -> Option<String> {
        read_env(&self.access_token_env)
    }

    /// Read the refresh token from the configured environment variable.
    pub fn refresh_token(&self) -> Option<String> {
        read_env(&self.refresh_token_env)
    }
}

fn read_env(var: &str) -> Option<String> {
    if var.is_empty() {
        return None;
    }
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://localhost:8080".into()
}
fn d_15000() -> u64 {
    15_000
}
fn d_2() -> u32 {
    2
}
fn d_access_env() -> String {
    "CALLIE_ACCESS_TOKEN".into()
}
fn d_refresh_env() -> String {
    "CALLIE_REFRESH_TOKEN".into()
}
