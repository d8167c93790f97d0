//! REST implementation of [`AgentApi`].
//!
//! `RestAgentClient` wraps a `reqwest::Client` and translates every trait
//! method into the corresponding call against the dashboard backend, with
//! retry + exponential back-off on transient (5xx / timeout) failures and
//! one silent token refresh on 401.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use callie_domain::agent::LlmConfig;
use callie_domain::config::ApiConfig;
use callie_domain::error::{Error, Result};
use callie_domain::trace::TraceEvent;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::provider::AgentApi;
use crate::types::{
    PhoneAssignmentUpdate, PhoneNumberDto, RefreshRequest, RefreshResponse, TemplateDto,
    VoiceAgentDto,
};

/// Notifications the client pushes to whoever owns the login state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request came back 401 and no refresh could rescue it. Stored
    /// tokens have been cleared.
    Expired { endpoint: String },
}

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// What a retried request ended with, short of a hard error.
enum Outcome {
    Done(Response),
    Unauthorized(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST client for the dashboard backend.
///
/// Cheap to clone; clones share the connection pool and the token pair.
#[derive(Debug, Clone)]
pub struct RestAgentClient {
    http: Client,
    base_url: Url,
    tokens: Arc<RwLock<Tokens>>,
    session_events: Option<mpsc::UnboundedSender<SessionEvent>>,
    timeout: Duration,
    max_retries: u32,
}

impl RestAgentClient {
    /// Build a client from `ApiConfig`, reading both tokens from the
    /// environment variables it names.
    pub fn new(cfg: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {}: {e}", cfg.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be a base URL", cfg.base_url)));
        }

        Ok(Self {
            http,
            base_url,
            tokens: Arc::new(RwLock::new(Tokens {
                access: cfg.access_token(),
                refresh: cfg.refresh_token(),
            })),
            session_events: None,
            timeout,
            max_retries: cfg.max_retries,
        })
    }

    /// Replace the token pair.
    pub fn with_tokens(self, access: Option<String>, refresh: Option<String>) -> Self {
        *self.tokens.write() = Tokens { access, refresh };
        self
    }

    /// Deliver [`SessionEvent`]s to `tx`.
    pub fn with_session_events(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.session_events = Some(tx);
        self
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The current access token, after any refresh.
    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().access.clone()
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Attach the bearer token and a fresh trace id.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let rb = rb.header("X-Trace-Id", Uuid::new_v4().to_string());
        match self.tokens.read().access.as_deref() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or spaces stay a single segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on timeouts / connection errors.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::ApiCall` after every attempt.
    async fn execute_with_retry<F>(&self, endpoint: &str, build_request: F) -> Result<Outcome>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff(attempt)).await;
            }

            let start = Instant::now();
            let result = self.decorate(build_request()).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status();

                    TraceEvent::ApiCall {
                        endpoint: endpoint.to_owned(),
                        status: status.as_u16(),
                        duration_ms,
                    }
                    .emit();

                    if status.is_server_error() {
                        // 5xx: transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(api_error(endpoint, status, body));
                        continue;
                    }

                    if status.is_client_error() {
                        // 4xx: permanent, do NOT retry
                        let body = resp.text().await.unwrap_or_default();
                        return match status {
                            StatusCode::UNAUTHORIZED => Ok(Outcome::Unauthorized(body)),
                            StatusCode::FORBIDDEN => Err(Error::Auth(format!(
                                "{endpoint} forbidden ({}): {body}",
                                status.as_u16()
                            ))),
                            StatusCode::NOT_FOUND => Err(Error::NotFound(endpoint.to_owned())),
                            _ => Err(api_error(endpoint, status, body)),
                        };
                    }

                    return Ok(Outcome::Done(resp));
                }
                Err(e) => {
                    TraceEvent::ApiCall {
                        endpoint: endpoint.to_owned(),
                        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                        duration_ms,
                    }
                    .emit();

                    last_err = Some(from_reqwest(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Http(format!("{endpoint}: all retries exhausted"))))
    }

    /// Run a request, refreshing the access token once on 401.
    async fn send<F>(&self, endpoint: &str, build_request: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let body = match self.execute_with_retry(endpoint, &build_request).await? {
            Outcome::Done(resp) => return Ok(resp),
            Outcome::Unauthorized(body) => body,
        };

        if !self.refresh().await {
            tracing::debug!(endpoint, body = %body, "401 without a usable refresh");
            return Err(self.expire(endpoint));
        }

        match self.execute_with_retry(endpoint, &build_request).await? {
            Outcome::Done(resp) => Ok(resp),
            Outcome::Unauthorized(body) => Err(Error::Auth(format!(
                "{endpoint} still unauthorized after refresh: {body}"
            ))),
        }
    }

    /// Trade the refresh token for a new pair. Returns whether the
    /// tokens were rotated.
    async fn refresh(&self) -> bool {
        let Some(refresh_token) = self.tokens.read().refresh.clone() else {
            tracing::warn!("no refresh token stored");
            return false;
        };

        let url = match self.url(&["api", "v1", "auth", "refresh"]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "cannot build refresh URL");
                return false;
            }
        };
        let result = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let rotated = match result {
            Ok(resp) if resp.status().is_success() => match resp.json::<RefreshResponse>().await {
                Ok(RefreshResponse {
                    kind: Some(kind),
                    access_token: Some(access),
                    refresh_token,
                }) if kind == "JWT" => {
                    let mut tokens = self.tokens.write();
                    tokens.access = Some(access);
                    if refresh_token.is_some() {
                        tokens.refresh = refresh_token;
                    }
                    true
                }
                Ok(_) => {
                    tracing::warn!("refresh response was not a JWT pair");
                    false
                }
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable refresh response");
                    false
                }
            },
            Ok(resp) => {
                tracing::warn!(status = resp.status().as_u16(), "refresh token rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh request failed");
                false
            }
        };

        TraceEvent::TokenRefreshed { succeeded: rotated }.emit();
        rotated
    }

    /// Clear the stored tokens and tell the session owner.
    fn expire(&self, endpoint: &str) -> Error {
        *self.tokens.write() = Tokens::default();
        match &self.session_events {
            Some(tx) => {
                let _ = tx.send(SessionEvent::Expired {
                    endpoint: endpoint.to_owned(),
                });
            }
            None => tracing::warn!(endpoint, "session expired with no listener attached"),
        }
        Error::SessionExpired
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl AgentApi for RestAgentClient {
    async fn fetch_agent(&self, agent_id: &str) -> Result<VoiceAgentDto> {
        let url = self.url(&["api", "v1", "get-voice-agent", agent_id])?;
        let resp = self
            .send("GET /api/v1/get-voice-agent", || self.http.get(url.clone()))
            .await?;
        parse("get-voice-agent", resp).await
    }

    async fn fetch_llm(&self, llm_id: &str) -> Result<serde_json::Value> {
        let url = self.url(&["api", "v1", "get-reacherr-llm", llm_id])?;
        let resp = self
            .send("GET /api/v1/get-reacherr-llm", || self.http.get(url.clone()))
            .await?;
        parse("get-reacherr-llm", resp).await
    }

    async fn create_from_template(&self, template_id: &str) -> Result<VoiceAgentDto> {
        let url = self.url(&["api", "v1", "create-agent-from-template", template_id])?;
        let resp = self
            .send("POST /api/v1/create-agent-from-template", || {
                self.http.post(url.clone())
            })
            .await?;
        parse("create-agent-from-template", resp).await
    }

    async fn list_templates(&self) -> Result<Vec<TemplateDto>> {
        let url = self.url(&["api", "v1", "templates"])?;
        let resp = self
            .send("GET /api/v1/templates", || self.http.get(url.clone()))
            .await?;
        parse("templates", resp).await
    }

    async fn save_llm(&self, llm: &LlmConfig) -> Result<()> {
        if llm.llm_id.is_empty() {
            return Err(Error::Other("cannot save an LLM without an llmId".into()));
        }
        let url = self.url(&["api", "v1", "update-reacherr-llm", &llm.llm_id])?;
        self.send("PATCH /api/v1/update-reacherr-llm", || {
            self.http.patch(url.clone()).json(llm)
        })
        .await?;
        Ok(())
    }

    async fn publish_agent(&self, agent_id: &str, payload: &VoiceAgentDto) -> Result<()> {
        let url = self.url(&["api", "v1", "publish-voice-agent", agent_id])?;
        self.send("PATCH /api/v1/publish-voice-agent", || {
            self.http.patch(url.clone()).json(payload)
        })
        .await?;
        Ok(())
    }

    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumberDto>> {
        let url = self.url(&["api", "v1", "list-phone-number"])?;
        let resp = self
            .send("POST /api/v1/list-phone-number", || self.http.post(url.clone()))
            .await?;
        parse("list-phone-number", resp).await
    }

    async fn update_phone_number(&self, update: &PhoneAssignmentUpdate) -> Result<()> {
        let url = self.url(&["api", "v1", "update-phone-number", &update.phone_number])?;
        self.send("POST /api/v1/update-phone-number", || {
            self.http.post(url.clone()).json(update)
        })
        .await?;
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 100 ms doubled per retry, saturating for large retry counts.
fn backoff(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(100u64.saturating_mul(factor))
}

async fn parse<T: DeserializeOwned>(what: &str, resp: Response) -> Result<T> {
    let body = resp.text().await.map_err(from_reqwest)?;
    serde_json::from_str(&body)
        .map_err(|e| Error::Other(format!("failed to parse {what} response: {e}: {body}")))
}

fn api_error(endpoint: &str, status: StatusCode, message: String) -> Error {
    Error::Api {
        endpoint: endpoint.to_owned(),
        status: status.as_u16(),
        message,
    }
}

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
