pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tecnicos-api")]
#[command(about = "Technician whitelist API - serve the HTTP API or run one-off checks")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Bind address (overrides HOST)")]
        host: Option<String>,
        #[arg(long, help = "Bind port (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Check whether a phone number is authorized, straight against the record store")]
    Check {
        #[arg(help = "Phone number exactly as stored")]
        telefone: String,
    },

    #[command(about = "List the fixed role catalogue")]
    Roles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();
    tracing::debug!("Loaded configuration: {:?}", config);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => commands::serve::handle(config, host, port).await,
        Commands::Check { telefone } => commands::check::handle(&config, &telefone, output_format).await,
        Commands::Roles => commands::roles::handle(output_format),
    }
}
