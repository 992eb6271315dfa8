// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Message commands
//!
//! Commands: rewrite, analyze. Both delegate to a running server when its
//! health check passes and fall back to embedded mode otherwise.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::info;

use parley_core::domain::attempt::AttemptLog;
use parley_core::domain::message::{AnalyzeRequest, RewriteRequest};
use parley_core::domain::service_config::ServiceConfig;

use crate::daemon::client::AnalysisView;
use crate::daemon::{check_server_running, ParleyClient, ServerStatus};
use crate::embedded::EmbeddedExecutor;

#[derive(Args, Debug, Clone)]
pub struct RewriteArgs {
    /// Message to rewrite
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Target tone (e.g. friendly, formal, direct)
    #[arg(short, long)]
    pub tone: Option<String>,

    /// Audience: colleague, manager, client, team, external
    #[arg(short, long)]
    pub context: Option<String>,

    /// Skip the running server and call providers in-process
    #[arg(long)]
    pub local: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Message to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Audience: colleague, manager, client, team, external
    #[arg(short, long)]
    pub context: Option<String>,

    /// Skip the running server and call providers in-process
    #[arg(long)]
    pub local: bool,
}

impl RewriteArgs {
    fn request(&self) -> RewriteRequest {
        RewriteRequest {
            text: self.text.clone(),
            tone: self.tone.clone(),
            context: self.context.clone(),
        }
    }
}

impl AnalyzeArgs {
    fn request(&self) -> AnalyzeRequest {
        AnalyzeRequest {
            text: self.text.clone(),
            context: self.context.clone(),
        }
    }
}

/// Returns a client when a healthy server answers at `host:port`
async fn running_server(local: bool, host: &str, port: u16) -> Result<Option<ParleyClient>> {
    if local {
        return Ok(None);
    }
    match check_server_running(host, port).await {
        Ok(ServerStatus::Running(_)) => {
            info!("Delegating to server API");
            Ok(Some(ParleyClient::new(host, port)?))
        }
        _ => {
            info!("Server not running, using embedded mode");
            Ok(None)
        }
    }
}

pub async fn rewrite(
    args: RewriteArgs,
    config: Result<ServiceConfig>,
    host: &str,
    port: u16,
) -> Result<()> {
    let request = args.request();

    let (result, provider) = match running_server(args.local, host, port).await? {
        Some(client) => {
            let rewrite = client.rewrite(&request).await?;
            (rewrite.result, rewrite.provider)
        }
        None => {
            let executor = EmbeddedExecutor::new(&config?)?;
            let rewrite = executor.rewrite(request).await?;
            print_skipped(&rewrite.attempts);
            (rewrite.result, Some(rewrite.provider))
        }
    };

    println!("{}", result);
    print_provider(provider.as_deref());
    Ok(())
}

pub async fn analyze(
    args: AnalyzeArgs,
    config: Result<ServiceConfig>,
    host: &str,
    port: u16,
) -> Result<()> {
    let request = args.request();

    let (view, provider) = match running_server(args.local, host, port).await? {
        Some(client) => client.analyze(&request).await?,
        None => {
            let executor = EmbeddedExecutor::new(&config?)?;
            let analysis = executor.analyze(request).await?;
            print_skipped(&analysis.attempts);
            let view = AnalysisView {
                tone: analysis.result.tone.to_string(),
                score: analysis.result.score,
                suggestions: analysis.result.suggestions,
            };
            (view, Some(analysis.provider))
        }
    };

    println!("{} {}", "Tone:".bold(), view.tone);
    println!("{} {}/100", "Score:".bold(), view.score);
    if !view.suggestions.is_empty() {
        println!("{}", "Suggestions:".bold());
        for suggestion in &view.suggestions {
            println!("  - {}", suggestion);
        }
    }
    print_provider(provider.as_deref());
    Ok(())
}

fn print_skipped(attempts: &AttemptLog) {
    for attempt in attempts.entries() {
        eprintln!("{}", format!("skipped {}", attempt).dimmed());
    }
}

fn print_provider(provider: Option<&str>) {
    if let Some(provider) = provider {
        eprintln!("{}", format!("via {}", provider).dimmed());
    }
}
