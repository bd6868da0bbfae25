//! Skolauth - OpenID Connect login for Skolengo schools
//!
#![doc = "Main entry point for the skolauth command."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skolauth::cli::{Cli, Commands};
use skolauth::commands;
use skolauth::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Search { text, json } => {
            tracing::debug!("Searching directory for \"{}\"", text);
            commands::search::run_search(config, text, json).await?;
            Ok(())
        }
        Commands::Login {
            query,
            select,
            no_browser,
        } => {
            tracing::info!("Starting login flow");
            if no_browser {
                tracing::debug!("Browser launch disabled");
            }
            commands::login::run_login(config, query, select, no_browser).await?;
            Ok(())
        }
        Commands::AuthorizeUrl { well_known } => {
            commands::authorize::run_authorize_url(config, well_known).await?;
            Ok(())
        }
        Commands::Exchange { well_known, code } => {
            commands::exchange::run_exchange(config, well_known, code).await?;
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_filter = if verbose { "skolauth=debug" } else { "skolauth=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
