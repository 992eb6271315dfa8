// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Server mode implementation
//!
//! Handles:
//! - Running the HTTP server in the foreground
//! - HTTP health checks against a running server
//! - Client used to delegate CLI commands to it

use anyhow::Result;
use std::time::Duration;

pub mod client;
pub mod server;

pub use client::{HealthReport, ParleyClient};
pub use server::start_server;

#[derive(Debug, Clone)]
pub enum ServerStatus {
    Running(HealthReport),
    Unhealthy { error: String },
    Stopped,
}

/// Probe `GET /health` on the given address
pub async fn check_server_running(host: &str, port: u16) -> Result<ServerStatus> {
    let client = ParleyClient::with_timeout(host, port, Duration::from_millis(500))?;

    match client.health().await {
        Ok(report) => Ok(ServerStatus::Running(report)),
        Err(e) if e.is_connect() => Ok(ServerStatus::Stopped),
        Err(e) => Ok(ServerStatus::Unhealthy {
            error: e.to_string(),
        }),
    }
}

/// Base URL for a host that may or may not carry a scheme
pub fn base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host.trim_end_matches('/'), port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("127.0.0.1", 8080), "http://127.0.0.1:8080");
        assert_eq!(base_url("https://parley.internal/", 443), "https://parley.internal:443");
    }

    #[tokio::test]
    async fn test_nothing_listening_is_stopped() {
        // Port 9 (discard) is essentially never bound on test hosts
        let status = check_server_running("127.0.0.1", 9).await.unwrap();
        assert!(matches!(status, ServerStatus::Stopped | ServerStatus::Unhealthy { .. }));
    }
}
