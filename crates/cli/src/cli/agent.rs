//! Agent subcommands. Each one runs a short-lived [`EditorSession`].

use std::sync::Arc;

use anyhow::Context;
use callie_client::{AgentApi, RestAgentClient, SessionEvent};
use callie_domain::config::Config;
use callie_editor::{EditorSession, PublishRequest};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// Build the REST client and forward session-expired events to stderr.
pub fn connect(config: &Config) -> anyhow::Result<Arc<dyn AgentApi>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let token_env = config.api.access_token_env.clone();
    let client = RestAgentClient::new(&config.api)
        .context("building API client")?
        .with_session_events(tx);
    tracing::debug!(base_url = %config.api.base_url, "API client ready");

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Expired { endpoint } => {
                    eprintln!("Session expired while calling {endpoint}; set {token_env} to a fresh token.");
                    tracing::warn!(%endpoint, "session expired");
                }
            }
        }
    });

    Ok(Arc::new(client))
}

pub async fn show(config: &Config, agent_id: &str, views: bool) -> anyhow::Result<()> {
    let session = open(config, agent_id).await?;
    if views {
        print_json(&*session.views())
    } else {
        print_json(&*session.record())
    }
}

pub async fn set(
    config: &Config,
    agent_id: &str,
    path: &str,
    raw_value: &str,
    publish_as: Option<String>,
) -> anyhow::Result<()> {
    let session = open(config, agent_id).await?;
    let value = parse_value(raw_value);

    session
        .set_path(path, value)
        .with_context(|| format!("setting {path}"))?;
    session.flush_autosave().await;

    let status = session.save_status();
    if let Some(err) = status.last_error {
        anyhow::bail!("saving {path}: {err}");
    }

    match publish_as {
        Some(version_name) => {
            publish_session(
                &session,
                PublishRequest {
                    version_name,
                    ..Default::default()
                },
            )
            .await?
        }
        None if status.last_saved_at.is_none() => {
            eprintln!("{path} changed locally; run with --publish to send it.");
        }
        None => println!("Saved {path}"),
    }

    session.shutdown();
    Ok(())
}

pub async fn publish(config: &Config, agent_id: &str, request: PublishRequest) -> anyhow::Result<()> {
    let session = open(config, agent_id).await?;
    publish_session(&session, request).await?;
    session.shutdown();
    Ok(())
}

pub async fn from_template(config: &Config, template_id: &str) -> anyhow::Result<()> {
    tracing::info!(template_id, "creating agent from template");
    let session = EditorSession::new(connect(config)?, &config.autosave);
    let record = session
        .create_from_template(template_id)
        .await
        .with_context(|| format!("creating agent from template {template_id}"))?;
    session.shutdown();
    print_json(&*record)
}

pub async fn templates(config: &Config) -> anyhow::Result<()> {
    let api = connect(config)?;
    let templates = api.list_templates().await.context("listing templates")?;

    if templates.is_empty() {
        println!("No templates.");
        return Ok(());
    }
    for t in templates {
        match t.template_type {
            Some(kind) => println!("{:<24} {} [{kind}]", t.id, t.name),
            None => println!("{:<24} {}", t.id, t.name),
        }
    }
    Ok(())
}

// ── helpers ─────────────────────────────────────────────────────────

async fn open(config: &Config, agent_id: &str) -> anyhow::Result<EditorSession> {
    tracing::info!(agent_id, "loading agent");
    let session = EditorSession::new(connect(config)?, &config.autosave);
    session
        .load_agent(agent_id)
        .await
        .with_context(|| format!("loading agent {agent_id}"))?;
    Ok(session)
}

async fn publish_session(session: &EditorSession, request: PublishRequest) -> anyhow::Result<()> {
    let version_name = request.version_name.clone();
    tracing::info!(version = %version_name, "publishing agent");
    let outcome = session
        .publish(request)
        .await
        .with_context(|| format!("publishing {version_name}"))?;

    println!("Published {version_name}");
    for update in &outcome.phone_updates {
        println!(
            "  {}  inbound={}  outbound={}",
            update.phone_number,
            update.inbound_agent_id.as_deref().unwrap_or("-"),
            update.outbound_agent_id.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// `0.8` is a number, `true` a bool, `hello` a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_words_are_strings() {
        assert_eq!(parse_value("0.8"), json!(0.8));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("hello"), json!("hello"));
        assert_eq!(parse_value(r#"["a","b"]"#), json!(["a", "b"]));
    }
}
