// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for communicating with a running Parley server

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use parley_core::domain::message::{AnalyzeRequest, RewriteRequest};
use parley_core::presentation::api::PROVIDER_HEADER;

use super::base_url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{kind}: {message} (HTTP {status})")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },
}

impl ClientError {
    /// Nothing accepted the connection
    pub fn is_connect(&self) -> bool {
        matches!(self, ClientError::Transport(e) if e.is_connect())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub mock_mode: bool,
    pub providers: Vec<String>,
    pub strategy: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRewrite {
    pub result: String,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisView {
    pub tone: String,
    pub score: u8,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ParleyClient {
    client: Client,
    base_url: String,
}

impl ParleyClient {
    pub fn new(host: &str, port: u16) -> Result<Self, ClientError> {
        Self::with_timeout(host, port, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(host: &str, port: u16, timeout: Duration) -> Result<Self, ClientError> {
        Self::from_base_url(base_url(host, port), timeout)
    }

    pub fn from_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn rewrite(&self, request: &RewriteRequest) -> Result<RemoteRewrite, ClientError> {
        #[derive(Deserialize)]
        struct RewriteResponse {
            result: String,
        }

        let response = self
            .client
            .post(format!("{}/api/rewrite", self.base_url))
            .json(request)
            .send()
            .await?;
        let response = check(response).await?;
        let provider = provider_of(&response);
        let body: RewriteResponse = response.json().await?;

        Ok(RemoteRewrite {
            result: body.result,
            provider,
        })
    }

    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<(AnalysisView, Option<String>), ClientError> {
        let response = self
            .client
            .post(format!("{}/api/analyze", self.base_url))
            .json(request)
            .send()
            .await?;
        let response = check(response).await?;
        let provider = provider_of(&response);

        Ok((response.json().await?, provider))
    }
}

fn provider_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(PROVIDER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Turn a non-2xx response into `ClientError::Api`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize, Default)]
    struct ErrorBody {
        #[serde(default)]
        error: String,
        #[serde(default)]
        message: Option<String>,
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let kind = if body.error.is_empty() {
        "HTTP_ERROR".to_string()
    } else {
        body.error
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message: body.message.unwrap_or_else(|| text.trim().to_string()),
        kind,
    })
}
