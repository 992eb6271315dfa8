// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `parley status`: probe a running server

use anyhow::Result;
use colored::Colorize;

use crate::daemon::{check_server_running, ServerStatus};

pub async fn status(host: &str, port: u16) -> Result<()> {
    match check_server_running(host, port).await? {
        ServerStatus::Running(report) => {
            println!("{}", "✓ Server is running".green());
            println!("  Address: {}:{}", host, port);
            println!("  Uptime: {}s", report.uptime_seconds);
            println!("  Strategy: {}", report.strategy);
            if report.mock_mode {
                println!("  Mode: {}", "mock".yellow());
            } else if report.providers.is_empty() {
                println!("  Providers: {}", "(none enabled)".red());
            } else {
                println!("  Providers: {}", report.providers.join(" → "));
            }
        }
        ServerStatus::Unhealthy { error } => {
            println!("{}", "⚠ Server is unhealthy".yellow());
            println!("  Error: {}", error);
        }
        ServerStatus::Stopped => {
            println!("{}", format!("✗ No server reachable at {}:{}", host, port).red());
            println!("Start one with: parley serve");
        }
    }

    Ok(())
}
