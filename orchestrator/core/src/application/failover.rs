// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Failover Orchestrator
//!
//! Walks the configured provider order until one adapter produces text.
//!
//! ```text
//! resolve(request)
//!   for id in order:
//!     no adapter          -> record Disabled, continue
//!     guard(adapter, dl)  -> Ok(text)  => return Resolution (stop here)
//!                         -> Err(e)    => record e, continue
//!   -> AllProvidersFailed(attempt log)
//! ```
//!
//! `FailoverStrategy::Race` starts every adapter at once instead; the first
//! success wins and the other calls are dropped. Sequential is the default
//! because it never pays for more than one vendor call when the first
//! provider is healthy.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::timeout_guard::guard;
use crate::domain::attempt::{Attempt, AttemptLog, Resolution};
use crate::domain::provider::{CallRequest, ProviderAdapter, ProviderError, ProviderId, ProviderOrder};
use crate::domain::service_config::FailoverStrategy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestrationError {
    #[error("AllProvidersFailed: {0}")]
    AllProvidersFailed(AttemptLog),
}

impl OrchestrationError {
    pub fn attempts(&self) -> &AttemptLog {
        match self {
            OrchestrationError::AllProvidersFailed(log) => log,
        }
    }
}

pub struct FailoverOrchestrator {
    order: ProviderOrder,
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    deadline: Duration,
    strategy: FailoverStrategy,
}

impl FailoverOrchestrator {
    /// Adapters are keyed by their own `id()`. Providers in `order` without an
    /// adapter are treated as disabled.
    pub fn new(
        order: ProviderOrder,
        adapters: impl IntoIterator<Item = Arc<dyn ProviderAdapter>>,
        deadline: Duration,
    ) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();
        Self {
            order,
            adapters,
            deadline,
            strategy: FailoverStrategy::Sequential,
        }
    }

    pub fn with_strategy(mut self, strategy: FailoverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn order(&self) -> &ProviderOrder {
        &self.order
    }

    pub fn strategy(&self) -> FailoverStrategy {
        self.strategy
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Providers in order that have an adapter
    pub fn enabled_providers(&self) -> Vec<ProviderId> {
        self.order
            .iter()
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }

    pub async fn resolve(&self, request: &CallRequest) -> Result<Resolution, OrchestrationError> {
        let result = match self.strategy {
            FailoverStrategy::Sequential => self.resolve_sequential(request).await,
            FailoverStrategy::Race => self.resolve_race(request).await,
        };

        if let Err(e) = &result {
            metrics::counter!("parley_orchestrations_failed_total").increment(1);
            warn!(attempts = e.attempts().len(), "All providers failed: {}", e);
        }
        result
    }

    async fn resolve_sequential(&self, request: &CallRequest) -> Result<Resolution, OrchestrationError> {
        let mut attempts = AttemptLog::new();

        for id in self.order.iter() {
            let Some(adapter) = self.adapters.get(&id) else {
                attempts.record(record_failure(id, ProviderError::Disabled, Duration::ZERO));
                continue;
            };

            let started = Instant::now();
            let outcome = settle(
                guard(adapter.invoke(request), self.deadline, &id.timeout_label()).await,
            );

            match outcome {
                Ok(text) => {
                    record_success(id, started.elapsed());
                    return Ok(Resolution {
                        text,
                        provider: id,
                        attempts,
                    });
                }
                Err(e) => attempts.record(record_failure(id, e, started.elapsed())),
            }
        }

        Err(OrchestrationError::AllProvidersFailed(attempts))
    }

    async fn resolve_race(&self, request: &CallRequest) -> Result<Resolution, OrchestrationError> {
        // Slots keep the log in provider order whatever the completion order
        let mut slots: Vec<Option<Attempt>> = vec![None; self.order.len()];
        let mut pending = FuturesUnordered::new();

        for (index, id) in self.order.iter().enumerate() {
            let Some(adapter) = self.adapters.get(&id).cloned() else {
                slots[index] = Some(record_failure(id, ProviderError::Disabled, Duration::ZERO));
                continue;
            };

            let deadline = self.deadline;
            pending.push(async move {
                let started = Instant::now();
                let label = id.timeout_label();
                let outcome = settle(guard(adapter.invoke(request), deadline, &label).await);
                (index, id, outcome, started.elapsed())
            });
        }

        while let Some((index, id, outcome, elapsed)) = pending.next().await {
            match outcome {
                Ok(text) => {
                    record_success(id, elapsed);
                    let attempts: Vec<Attempt> = slots.into_iter().flatten().collect();
                    return Ok(Resolution {
                        text,
                        provider: id,
                        attempts: attempts.into(),
                    });
                }
                Err(e) => slots[index] = Some(record_failure(id, e, elapsed)),
            }
        }

        let attempts: Vec<Attempt> = slots.into_iter().flatten().collect();
        Err(OrchestrationError::AllProvidersFailed(attempts.into()))
    }
}

/// Whitespace-only success is not a usable answer
fn settle(outcome: Result<String, ProviderError>) -> Result<String, ProviderError> {
    match outcome {
        Ok(text) if text.trim().is_empty() => Err(ProviderError::Empty),
        other => other,
    }
}

fn record_success(id: ProviderId, elapsed: Duration) {
    metrics::counter!("parley_provider_attempts_total", "provider" => id.as_str(), "outcome" => "success")
        .increment(1);
    info!(
        provider = %id,
        elapsed_ms = elapsed.as_millis() as u64,
        "Provider produced a response"
    );
}

fn record_failure(id: ProviderId, error: ProviderError, elapsed: Duration) -> Attempt {
    let kind = error.kind();
    metrics::counter!("parley_provider_attempts_total", "provider" => id.as_str(), "outcome" => kind.as_str())
        .increment(1);
    warn!(
        provider = %id,
        kind = %kind,
        elapsed_ms = elapsed.as_millis() as u64,
        "Provider attempt failed: {}",
        error
    );
    Attempt::failed(id, &error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::FailureKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedAdapter {
        id: ProviderId,
        outcome: Result<String, ProviderError>,
        calls: AtomicUsize,
    }

    impl FixedAdapter {
        fn new(id: ProviderId, outcome: Result<&str, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                id,
                outcome: outcome.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for FixedAdapter {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn invoke(&self, _request: &CallRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn request() -> CallRequest {
        CallRequest::text("Rewrite: hi").unwrap()
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let openai = FixedAdapter::new(ProviderId::OpenAi, Err(ProviderError::Upstream("HTTP 500".into())));
        let anthropic = FixedAdapter::new(ProviderId::Anthropic, Ok("from anthropic"));
        let gemini = FixedAdapter::new(ProviderId::Gemini, Ok("from gemini"));

        let orchestrator = FailoverOrchestrator::new(
            ProviderOrder::new(ProviderId::ALL),
            [
                openai.clone() as Arc<dyn ProviderAdapter>,
                anthropic.clone() as Arc<dyn ProviderAdapter>,
                gemini.clone() as Arc<dyn ProviderAdapter>,
            ],
            Duration::from_secs(1),
        );

        let resolution = orchestrator.resolve(&request()).await.unwrap();
        assert_eq!(resolution.text, "from anthropic");
        assert_eq!(resolution.provider, ProviderId::Anthropic);
        assert_eq!(resolution.attempts.providers(), vec![ProviderId::OpenAi]);
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_adapter_is_recorded_as_disabled() {
        let gemini = FixedAdapter::new(ProviderId::Gemini, Ok("ok"));
        let orchestrator = FailoverOrchestrator::new(
            ProviderOrder::new([ProviderId::OpenAi, ProviderId::Gemini]),
            [gemini as Arc<dyn ProviderAdapter>],
            Duration::from_secs(1),
        );

        let resolution = orchestrator.resolve(&request()).await.unwrap();
        assert_eq!(resolution.attempts.len(), 1);
        assert_eq!(resolution.attempts.entries()[0].kind, FailureKind::Disabled);
        assert_eq!(orchestrator.enabled_providers(), vec![ProviderId::Gemini]);
    }

    #[tokio::test]
    async fn test_blank_success_counts_as_empty() {
        let openai = FixedAdapter::new(ProviderId::OpenAi, Ok("   "));
        let orchestrator = FailoverOrchestrator::new(
            ProviderOrder::new([ProviderId::OpenAi]),
            [openai as Arc<dyn ProviderAdapter>],
            Duration::from_secs(1),
        );

        let err = orchestrator.resolve(&request()).await.unwrap_err();
        assert_eq!(err.attempts().entries()[0].kind, FailureKind::Empty);
    }

    #[tokio::test]
    async fn test_empty_order_fails_without_attempts() {
        let orchestrator = FailoverOrchestrator::new(
            ProviderOrder::default(),
            [FixedAdapter::new(ProviderId::OpenAi, Ok("unused")) as Arc<dyn ProviderAdapter>],
            Duration::from_secs(1),
        );

        let err = orchestrator.resolve(&request()).await.unwrap_err();
        assert!(err.attempts().is_empty());
        assert_eq!(err.to_string(), "AllProvidersFailed: no providers configured");
    }
}
