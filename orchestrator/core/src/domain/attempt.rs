// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Per-request record of provider attempts

use serde::Serialize;
use std::fmt;

use super::provider::{FailureKind, ProviderError, ProviderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub provider: ProviderId,
    pub kind: FailureKind,
    pub detail: String,
}

impl Attempt {
    pub fn failed(provider: ProviderId, error: &ProviderError) -> Self {
        Self {
            provider,
            kind: error.kind(),
            detail: error.detail(),
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.provider, self.kind, self.detail)
    }
}

/// Failed attempts of one orchestration run, in provider order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttemptLog(Vec<Attempt>);

impl AttemptLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn record(&mut self, attempt: Attempt) {
        self.0.push(attempt);
    }

    pub fn entries(&self) -> &[Attempt] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        self.0.iter().map(|a| a.provider).collect()
    }
}

impl From<Vec<Attempt>> for AttemptLog {
    fn from(attempts: Vec<Attempt>) -> Self {
        Self(attempts)
    }
}

impl fmt::Display for AttemptLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no providers configured");
        }
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Successful orchestration outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    /// Provider whose answer was used
    pub provider: ProviderId,
    /// Failures that happened before `provider` succeeded
    pub attempts: AttemptLog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_log_display() {
        let mut log = AttemptLog::new();
        assert_eq!(log.to_string(), "no providers configured");

        log.record(Attempt::failed(ProviderId::OpenAi, &ProviderError::Disabled));
        log.record(Attempt::failed(
            ProviderId::Gemini,
            &ProviderError::Upstream("TIMEOUT_GEMINI".into()),
        ));

        assert_eq!(
            log.to_string(),
            "openai: Disabled (no credential configured); gemini: Upstream (TIMEOUT_GEMINI)"
        );
        assert_eq!(log.providers(), vec![ProviderId::OpenAi, ProviderId::Gemini]);
    }
}
