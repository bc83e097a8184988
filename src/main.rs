//! Assis - conversation history CLI
//!
#![doc = "Main entry point for the Assis command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assis::cli::{Cli, Commands};
use assis::commands;
use assis::config::{Config, DEFAULT_CONFIG_PATH};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::History { command } => {
            tracing::debug!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Settings { command } => {
            tracing::debug!("Starting settings command");
            commands::settings::handle_settings(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "assis=debug" } else { "assis=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
