// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use parley_core::domain::provider::ProviderId;
use parley_core::domain::service_config::ServiceConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./parley-config.yaml)
        #[arg(short, long, default_value = "./parley-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config: Result<ServiceConfig>,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config?, config_override, paths),
        ConfigCommand::Validate { file: Some(file) } => validate(
            ServiceConfig::load_or_default(Some(file)).context("Failed to load configuration"),
        ),
        ConfigCommand::Validate { file: None } => validate(config),
        ConfigCommand::Generate { output, examples } => generate(output, examples),
    }
}

fn show(config: ServiceConfig, config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. PARLEY_CONFIG_PATH: {}",
            std::env::var("PARLEY_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./parley-config.yaml");
        println!("  4. ~/.parley/config.yaml");
        println!("  5. /etc/parley/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    let server = &config.spec.server;
    println!("{}", "Server:".bold());
    println!("  Address: {}:{}", server.bind_address, server.port);
    println!("  Requests per minute: {}", server.requests_per_minute);
    println!("  Max body bytes: {}", server.max_body_bytes);
    if server.cors_origins.is_empty() {
        println!("  CORS origins: {}", "(any)".dimmed());
    } else {
        println!("  CORS origins: {}", server.cors_origins.join(", "));
    }
    println!();

    let providers = &config.spec.providers;
    println!("{}", "Providers:".bold());
    println!("  Order: {}", providers.order);
    println!("  Strategy: {:?}", providers.strategy);
    println!("  Timeout: {} ms", providers.timeout_ms);
    for id in ProviderId::ALL {
        let provider = providers.provider(id);
        let settings = provider.generation_settings(id);
        println!("  {}", id.as_str().bold());
        println!("    Endpoint: {}", provider.endpoint(id));
        println!("    Model: {}", settings.model);
        // Only the reference is printed, never a resolved secret
        let credential = provider.credential_ref(id);
        if credential.starts_with("env:") {
            println!("    Credential: {}", credential);
        } else {
            println!("    Credential: {}", "(inline)".dimmed());
        }
    }
    println!();

    println!("{}", "Runtime:".bold());
    println!("  Mock mode: {}", config.spec.mock_mode);
    println!("  Max text chars: {}", config.spec.limits.max_text_chars);
    println!(
        "  Logging: {} ({:?})",
        config.spec.observability.log_level, config.spec.observability.log_format
    );
    println!();

    Ok(())
}

fn validate(config: Result<ServiceConfig>) -> Result<()> {
    println!("Validating configuration...");

    let config = config?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
