// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Parley CLI
//!
//! The `parley` binary runs the message rewrite service and talks to it.
//!
//! ## Architecture
//!
//! - **Server mode**: `parley serve` runs the HTTP API in the foreground
//! - **Client mode**: `rewrite`/`analyze` delegate to a running server if its
//!   health check passes, else build the same services in-process
//!
//! ## Commands
//!
//! - `parley serve` - Run the HTTP server
//! - `parley status` - Probe a running server
//! - `parley rewrite|analyze <TEXT>` - Message operations
//! - `parley config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use parley_cli::commands::{self, AnalyzeArgs, ConfigCommand, RewriteArgs};
use parley_cli::daemon;
use parley_cli::embedded::load_config;
use parley_core::domain::service_config::{LogFormat, ObservabilityConfig, ServiceConfig};

/// Parley - rewrite and analyze business messages through LLM providers
#[derive(Parser)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "PARLEY_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (default: from configuration, 8080)
    #[arg(long, global = true, env = "PARLEY_PORT")]
    port: Option<u16>,

    /// HTTP API host (default: from configuration, 127.0.0.1)
    #[arg(long, global = true, env = "PARLEY_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PARLEY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server until Ctrl+C or SIGTERM
    Serve,

    /// Check whether a server is running
    Status,

    /// Rewrite a message in a different tone
    Rewrite(RewriteArgs),

    /// Score a message's tone and suggest improvements
    Analyze(AnalyzeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env values become visible to config discovery and env overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Loaded once; a broken config file is reported by the command that needs it
    let loaded = load_config(cli.config.clone(), cli.log_level.as_deref(), std::io::stderr);
    let observability: ObservabilityConfig = loaded
        .as_ref()
        .map(|config| config.spec.observability.clone())
        .unwrap_or_default();
    init_logging(
        cli.log_level.as_deref().unwrap_or(&observability.log_level),
        observability.log_format,
    )?;

    let (host, port) = client_target(loaded.as_ref().ok(), cli.host.clone(), cli.port);

    match cli.command {
        Commands::Serve => daemon::start_server(loaded?, cli.host, cli.port).await,
        Commands::Status => commands::status::status(&host, port).await,
        Commands::Rewrite(args) => commands::message::rewrite(args, loaded, &host, port).await,
        Commands::Analyze(args) => commands::message::analyze(args, loaded, &host, port).await,
        Commands::Config { command } => {
            commands::config::handle_command(command, loaded, cli.config).await
        }
    }
}

/// Where client commands look for a server
fn client_target(
    config: Option<&ServiceConfig>,
    host: Option<String>,
    port: Option<u16>,
) -> (String, u16) {
    let server = config.map(|c| c.spec.server.clone()).unwrap_or_default();
    let host = host.unwrap_or_else(|| match server.bind_address.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1".to_string(),
        other => other.to_string(),
    });
    (host, port.unwrap_or(server.port))
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
