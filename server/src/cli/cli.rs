// server/src/cli/cli.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib::config::{load_app_config, AppConfig, StorageEngineType};
use log::{debug, info};

use crate::cli::handlers;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Appointment scheduling portal server", long_about = None)]
#[clap(propagate_version = true)]
pub struct CliArgs {
    /// YAML configuration file. Defaults to ./scheduler_config.yaml when present.
    #[clap(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Address to listen on, overriding server.host.
    #[clap(long, value_name = "HOST")]
    pub host: Option<String>,
    /// Port to listen on, overriding server.port.
    #[clap(long, short = 'p', value_parser = clap::value_parser!(u16))]
    pub port: Option<u16>,
    /// Storage engine, overriding storage.engine.
    #[clap(long, value_name = "ENGINE", value_parser = parse_storage_engine)]
    pub storage: Option<StorageEngineType>,
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (the default).
    Serve,
    /// Create missing tables in the configured store and exit.
    InitSchema,
    /// Print the role an email resolves to under the current allow-lists.
    ResolveRole {
        #[clap(value_name = "EMAIL")]
        email: String,
    },
    /// Print the effective configuration with secrets masked.
    ShowConfig,
}

pub fn parse_storage_engine(engine: &str) -> Result<StorageEngineType, String> {
    engine.parse::<StorageEngineType>().map_err(|_| {
        format!("Invalid storage engine: {}. Supported: inmemory, in-memory, memory, postgres, postgresql", engine)
    })
}

/// Command-line flags win over the file and the environment.
pub fn apply_overrides(mut config: AppConfig, args: &CliArgs) -> AppConfig {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(engine) = args.storage {
        config.storage.engine = engine;
    }
    config
}

pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    debug!("Parsed arguments: {:?}", args);

    let config = load_app_config(args.config.as_deref()).context("failed to load configuration")?;
    let config = apply_overrides(config, &args);
    config.validate().context("invalid configuration")?;

    match args.command.clone().unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting on {} storage", config.storage.engine);
            handlers::handle_serve(config).await
        }
        Commands::InitSchema => handlers::handle_init_schema(config).await,
        Commands::ResolveRole { email } => handlers::handle_resolve_role(&config, &email),
        Commands::ShowConfig => handlers::handle_show_config(&config),
    }
}
