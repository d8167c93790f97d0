pub mod agent;
pub mod config;

use clap::{Parser, Subcommand};

/// Callie: inspect, edit and publish voice agents from the terminal.
#[derive(Debug, Parser)]
#[command(name = "callie", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print an agent as the editor sees it.
    Show {
        /// Agent ID.
        agent_id: String,
        /// Print the per-panel views instead of the canonical record.
        #[arg(long)]
        views: bool,
    },
    /// Change one field by dotted path (e.g. `ttsConfig.settings.volume 0.8`).
    ///
    /// LLM fields are saved right away; everything else is only sent on publish.
    Set {
        /// Agent ID.
        agent_id: String,
        /// Dotted path into the record, e.g. `reacherrLlmData.temperature`.
        path: String,
        /// JSON value. Anything that is not valid JSON is taken as a string.
        value: String,
        /// Publish afterwards under this version name.
        #[arg(long)]
        publish: Option<String>,
    },
    /// Publish an agent and assign phone numbers to it.
    Publish {
        /// Agent ID.
        agent_id: String,
        /// Version label shown in the dashboard.
        #[arg(long)]
        version_name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Phone number for inbound calls.
        #[arg(long)]
        inbound: Option<String>,
        /// Phone number for outbound calls.
        #[arg(long)]
        outbound: Option<String>,
    },
    /// Create an agent from a template and print it.
    FromTemplate {
        /// Template ID (see `callie templates`).
        template_id: String,
    },
    /// List available templates.
    Templates,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `CALLIE_CONFIG` (or
/// `callie.toml` by default). A missing file means all defaults.
pub fn load_config() -> anyhow::Result<(callie_domain::config::Config, String)> {
    let config_path = std::env::var("CALLIE_CONFIG").unwrap_or_else(|_| "callie.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        callie_domain::config::Config::default()
    };

    Ok((config, config_path))
}
