// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Provider
//!
//! Uniform contract every LLM vendor adapter implements.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-Corruption Layer between orchestration and vendor APIs
//!
//! The orchestrator only ever sees `ProviderAdapter`, `CallRequest` and
//! `ProviderError`. Vendor request/response shapes live in
//! `infrastructure/llm/`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic name of a supported LLM vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Label used in timeout details, e.g. `TIMEOUT_OPENAI`
    pub fn timeout_label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider: '{0}' (expected openai, anthropic or gemini)")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "anthropic" => Ok(ProviderId::Anthropic),
            "gemini" => Ok(ProviderId::Gemini),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Ordered provider preference. Duplicates are dropped, keeping the first
/// occurrence. An empty order is valid and always fails orchestration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProviderId>", into = "Vec<ProviderId>")]
pub struct ProviderOrder(Vec<ProviderId>);

impl ProviderOrder {
    pub fn new(ids: impl IntoIterator<Item = ProviderId>) -> Self {
        let mut order = Vec::new();
        for id in ids {
            if !order.contains(&id) {
                order.push(id);
            }
        }
        Self(order)
    }

    pub fn iter(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, id: ProviderId) -> Option<usize> {
        self.0.iter().position(|p| *p == id)
    }
}

impl From<Vec<ProviderId>> for ProviderOrder {
    fn from(ids: Vec<ProviderId>) -> Self {
        Self::new(ids)
    }
}

impl From<ProviderOrder> for Vec<ProviderId> {
    fn from(order: ProviderOrder) -> Self {
        order.0
    }
}

impl FromStr for ProviderOrder {
    type Err = UnknownProvider;

    /// Parse a comma separated list such as `gemini, openai`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ProviderId::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(ids))
    }
}

impl fmt::Display for ProviderOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(ProviderId::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// A single prompt handed to the provider layer. Built once per inbound
/// request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    prompt: String,
    wants_structured_output: bool,
}

impl CallRequest {
    /// Returns `None` when the prompt is blank.
    pub fn new(prompt: impl Into<String>, wants_structured_output: bool) -> Option<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return None;
        }
        Some(Self {
            prompt,
            wants_structured_output,
        })
    }

    pub fn text(prompt: impl Into<String>) -> Option<Self> {
        Self::new(prompt, false)
    }

    pub fn structured(prompt: impl Into<String>) -> Option<Self> {
        Self::new(prompt, true)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn wants_structured_output(&self) -> bool {
        self.wants_structured_output
    }
}

/// Model selection and sampling parameters for one adapter
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Vendor model identifier (e.g. "gpt-4o-mini")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Domain interface for LLM vendors.
///
/// One invocation performs exactly one outbound call. Adapters never retry;
/// moving to another provider is the orchestrator's job.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Produce text for the prompt. When `wants_structured_output` is set the
    /// adapter asks for the vendor's JSON mode if it has one, but the returned
    /// text is not guaranteed to be valid JSON.
    async fn invoke(&self, request: &CallRequest) -> Result<String, ProviderError>;
}

/// Category of a single failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    Disabled,
    Empty,
    Upstream,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Disabled => "Disabled",
            FailureKind::Empty => "Empty",
            FailureKind::Upstream => "Upstream",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a single adapter invocation can produce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("no credential configured")]
    Disabled,

    #[error("provider returned no text")]
    Empty,

    /// Vendor call failed or the deadline elapsed
    #[error("{0}")]
    Upstream(String),
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Disabled => FailureKind::Disabled,
            ProviderError::Empty => FailureKind::Empty,
            ProviderError::Upstream(_) => FailureKind::Upstream,
        }
    }

    pub fn detail(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_order_drops_duplicates() {
        let order = ProviderOrder::new([
            ProviderId::Gemini,
            ProviderId::OpenAi,
            ProviderId::Gemini,
            ProviderId::OpenAi,
        ]);
        assert_eq!(order.iter().collect::<Vec<_>>(), vec![ProviderId::Gemini, ProviderId::OpenAi]);
        assert_eq!(order.position(ProviderId::OpenAi), Some(1));
        assert_eq!(order.position(ProviderId::Anthropic), None);
    }

    #[test]
    fn test_provider_order_from_str() {
        let order: ProviderOrder = " Anthropic , gemini,,anthropic".parse().unwrap();
        assert_eq!(order.to_string(), "anthropic,gemini");

        let empty: ProviderOrder = "".parse().unwrap();
        assert!(empty.is_empty());

        assert!("openai,mistral".parse::<ProviderOrder>().is_err());
    }

    #[test]
    fn test_provider_order_yaml_dedup() {
        let order: ProviderOrder = serde_yaml::from_str("[openai, gemini, openai]").unwrap();
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_call_request_rejects_blank_prompt() {
        assert!(CallRequest::text("   \n").is_none());
        let request = CallRequest::structured("Analyze this").unwrap();
        assert!(request.wants_structured_output());
        assert_eq!(request.prompt(), "Analyze this");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProviderError::Disabled.kind(), FailureKind::Disabled);
        assert_eq!(ProviderError::Empty.kind(), FailureKind::Empty);
        let timeout = ProviderError::Upstream("TIMEOUT_GEMINI".into());
        assert_eq!(timeout.kind(), FailureKind::Upstream);
        assert_eq!(timeout.detail(), "TIMEOUT_GEMINI");
        assert_eq!(ProviderId::Gemini.timeout_label(), "GEMINI");
    }
}
