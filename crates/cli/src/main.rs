use clap::Parser;
use tracing_subscriber::EnvFilter;

use callie_cli::cli::{self, agent, Cli, Command, ConfigCommand};
use callie_domain::config::LoggingConfig;
use callie_editor::PublishRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Show { agent_id, views } => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.logging);
            agent::show(&config, &agent_id, views).await
        }
        Command::Set {
            agent_id,
            path,
            value,
            publish,
        } => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.logging);
            agent::set(&config, &agent_id, &path, &value, publish).await
        }
        Command::Publish {
            agent_id,
            version_name,
            description,
            inbound,
            outbound,
        } => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.logging);
            let request = PublishRequest {
                version_name,
                description,
                inbound,
                outbound,
            };
            agent::publish(&config, &agent_id, request).await
        }
        Command::FromTemplate { template_id } => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.logging);
            agent::from_template(&config, &template_id).await
        }
        Command::Templates => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.logging);
            agent::templates(&config).await
        }
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = cli::load_config()?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _) = cli::load_config()?;
            cli::config::show(&config)
        }
        Command::Version => {
            println!("callie {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(logging: &LoggingConfig) {
    let default = logging.filter.as_deref().unwrap_or("warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
