// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Message Service
//!
//! Application service behind the rewrite and analyze endpoints.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Validate input, render the prompt, run failover and
//!   shape the provider text into a response
//! - **Collaborators:**
//!   - Domain: `RewriteRequest`, `AnalyzeRequest`, `AnalysisResult`
//!   - Application: `FailoverOrchestrator`, `normalizer`
//!   - Infrastructure: `PromptTemplateEngine`
//!
//! # Flow
//!
//! 1. Validate the request against the configured text limit
//! 2. Render the `rewrite` or `analyze` prompt
//! 3. Resolve through the orchestrator (structured output for analyze only)
//! 4. Trim the rewrite text, or normalize the analyze text
//!
//! `MockMessageService` keeps steps 1 and 4 but never calls a provider.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::failover::{FailoverOrchestrator, OrchestrationError};
use super::normalizer::{normalize, NormalizeError};
use crate::domain::analysis::{AnalysisResult, Tone};
use crate::domain::attempt::AttemptLog;
use crate::domain::message::{AnalyzeRequest, RewriteRequest, ValidationError};
use crate::domain::provider::{CallRequest, ProviderId};
use crate::domain::service_config::FailoverStrategy;
use crate::infrastructure::prompt_template_engine::PromptTemplateEngine;

/// Label reported as the answering provider in mock mode
pub const MOCK_PROVIDER: &str = "mock";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("AllProvidersFailed: {0}")]
    AllProvidersFailed(AttemptLog),

    #[error("Unparseable: {0}")]
    Unparseable(String),

    #[error("PromptError: {0}")]
    Prompt(String),
}

impl MessageError {
    /// Failure kind name exposed to HTTP clients
    pub fn kind(&self) -> &'static str {
        match self {
            MessageError::Validation(e) => e.code(),
            MessageError::AllProvidersFailed(_) => "AllProvidersFailed",
            MessageError::Unparseable(_) => "Unparseable",
            MessageError::Prompt(_) => "PromptError",
        }
    }
}

impl From<OrchestrationError> for MessageError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::AllProvidersFailed(log) => MessageError::AllProvidersFailed(log),
        }
    }
}

impl From<NormalizeError> for MessageError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Unparseable { excerpt } => MessageError::Unparseable(excerpt),
        }
    }
}

/// Rewritten message and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub result: String,
    pub provider: String,
    pub attempts: AttemptLog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub provider: String,
    pub attempts: AttemptLog,
}

/// What the service is wired to, reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub mock_mode: bool,
    pub providers: Vec<ProviderId>,
    pub strategy: FailoverStrategy,
}

#[async_trait]
pub trait MessageService: Send + Sync {
    /// Rewrite a message in the requested tone for the given audience
    async fn rewrite(&self, request: RewriteRequest) -> Result<Rewrite, MessageError>;

    /// Score a message's tone and propose up to three improvements
    async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis, MessageError>;

    fn info(&self) -> ServiceInfo;
}

/// Standard implementation backed by real providers
pub struct StandardMessageService {
    orchestrator: Arc<FailoverOrchestrator>,
    prompts: PromptTemplateEngine,
    max_text_chars: usize,
}

impl StandardMessageService {
    pub fn new(
        orchestrator: Arc<FailoverOrchestrator>,
        prompts: PromptTemplateEngine,
        max_text_chars: usize,
    ) -> Self {
        Self {
            orchestrator,
            prompts,
            max_text_chars,
        }
    }

    fn call_request(prompt: String, structured: bool) -> Result<CallRequest, MessageError> {
        CallRequest::new(prompt, structured)
            .ok_or_else(|| MessageError::Prompt("rendered prompt is empty".to_string()))
    }
}

#[async_trait]
impl MessageService for StandardMessageService {
    async fn rewrite(&self, request: RewriteRequest) -> Result<Rewrite, MessageError> {
        let input = request.validate(self.max_text_chars)?;
        let prompt = self
            .prompts
            .render_rewrite(&input)
            .map_err(|e| MessageError::Prompt(e.to_string()))?;

        debug!(tone = %input.tone, context = %input.context, "Rewriting message");
        let resolution = self
            .orchestrator
            .resolve(&Self::call_request(prompt, false)?)
            .await?;

        info!(
            provider = %resolution.provider,
            failed_attempts = resolution.attempts.len(),
            "Rewrite completed"
        );
        Ok(Rewrite {
            result: resolution.text.trim().to_string(),
            provider: resolution.provider.to_string(),
            attempts: resolution.attempts,
        })
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis, MessageError> {
        let input = request.validate(self.max_text_chars)?;
        let prompt = self
            .prompts
            .render_analyze(&input)
            .map_err(|e| MessageError::Prompt(e.to_string()))?;

        let resolution = self
            .orchestrator
            .resolve(&Self::call_request(prompt, true)?)
            .await?;
        let result = normalize(&resolution.text)?;

        info!(
            provider = %resolution.provider,
            tone = %result.tone,
            score = result.score,
            "Analysis completed"
        );
        Ok(Analysis {
            result,
            provider: resolution.provider.to_string(),
            attempts: resolution.attempts,
        })
    }

    fn info(&self) -> ServiceInfo {
        ServiceInfo {
            mock_mode: false,
            providers: self.orchestrator.enabled_providers(),
            strategy: self.orchestrator.strategy(),
        }
    }
}

/// Deterministic stand-in used for local development and demos
pub struct MockMessageService {
    max_text_chars: usize,
    strategy: FailoverStrategy,
}

impl MockMessageService {
    pub fn new(max_text_chars: usize) -> Self {
        Self {
            max_text_chars,
            strategy: FailoverStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: FailoverStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[async_trait]
impl MessageService for MockMessageService {
    async fn rewrite(&self, request: RewriteRequest) -> Result<Rewrite, MessageError> {
        let input = request.validate(self.max_text_chars)?;
        Ok(Rewrite {
            result: format!("[mock:{}/{}] {}", input.tone, input.context, input.text),
            provider: MOCK_PROVIDER.to_string(),
            attempts: AttemptLog::new(),
        })
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis, MessageError> {
        let input = request.validate(self.max_text_chars)?;
        let length = input.text.chars().count() as i64;
        Ok(Analysis {
            result: AnalysisResult::new(
                Tone::Neutral,
                40 + length % 60,
                vec![
                    "Lead with the request or decision you need.".to_string(),
                    "Close with a clear next step and timeline.".to_string(),
                ],
            ),
            provider: MOCK_PROVIDER.to_string(),
            attempts: AttemptLog::new(),
        })
    }

    fn info(&self) -> ServiceInfo {
        ServiceInfo {
            mock_mode: true,
            providers: Vec::new(),
            strategy: self.strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::{ProviderAdapter, ProviderError, ProviderOrder};
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedAdapter {
        id: ProviderId,
        reply: Result<String, ProviderError>,
        seen: Mutex<Vec<CallRequest>>,
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn invoke(&self, request: &CallRequest) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn service_with(reply: Result<String, ProviderError>) -> (StandardMessageService, Arc<ScriptedAdapter>) {
        let adapter = Arc::new(ScriptedAdapter {
            id: ProviderId::Anthropic,
            reply,
            seen: Mutex::new(Vec::new()),
        });
        let orchestrator = FailoverOrchestrator::new(
            ProviderOrder::new(ProviderId::ALL),
            vec![adapter.clone() as Arc<dyn ProviderAdapter>],
            Duration::from_secs(5),
        );
        let service = StandardMessageService::new(
            Arc::new(orchestrator),
            PromptTemplateEngine::new().unwrap(),
            4000,
        );
        (service, adapter)
    }

    #[tokio::test]
    async fn test_rewrite_trims_and_reports_failed_attempts() {
        let (service, adapter) = service_with(Ok("  Could you send the report?  \n".into()));

        let rewrite = service
            .rewrite(RewriteRequest::new("send the report").with_tone("friendly"))
            .await
            .unwrap();

        assert_eq!(rewrite.result, "Could you send the report?");
        assert_eq!(rewrite.provider, "anthropic");
        // openai precedes anthropic in the default order and has no adapter
        assert_eq!(rewrite.attempts.providers(), vec![ProviderId::OpenAi]);

        let seen = adapter.seen.lock().unwrap();
        assert!(!seen[0].wants_structured_output());
        assert!(seen[0].prompt().contains("send the report"));
    }

    #[tokio::test]
    async fn test_analyze_requests_structured_output_and_normalizes() {
        let (service, adapter) = service_with(Ok(
            "Sure! {\"tone\":\"formal\",\"score\":\"71.6\",\"suggestions\":[\"Shorten it\"]}".into(),
        ));

        let analysis = service
            .analyze(AnalyzeRequest::new("Per my last email."))
            .await
            .unwrap();

        assert_eq!(analysis.result.tone, Tone::Formal);
        assert_eq!(analysis.result.score, 72);
        assert_eq!(analysis.result.suggestions, vec!["Shorten it".to_string()]);
        assert!(adapter.seen.lock().unwrap()[0].wants_structured_output());
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_provider_call() {
        let (service, adapter) = service_with(Ok("unused".into()));

        let err = service.rewrite(RewriteRequest::new("   ")).await.unwrap_err();

        assert_eq!(err, MessageError::Validation(ValidationError::TextRequired));
        assert_eq!(err.kind(), "TEXT_REQUIRED");
        assert!(adapter.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_core_failures_are_named_by_kind() {
        let (service, _) = service_with(Err(ProviderError::Upstream("HTTP 503".into())));
        let err = service.rewrite(RewriteRequest::new("hello")).await.unwrap_err();
        assert_eq!(err.kind(), "AllProvidersFailed");
        assert!(err.to_string().starts_with("AllProvidersFailed: "));
        assert!(err.to_string().contains("anthropic: Upstream (HTTP 503)"));

        let (service, _) = service_with(Ok("no json here".into()));
        let err = service.analyze(AnalyzeRequest::new("hello")).await.unwrap_err();
        assert_eq!(err.kind(), "Unparseable");
        assert!(err.to_string().starts_with("Unparseable: "));
    }

    #[tokio::test]
    async fn test_mock_service_is_deterministic() {
        let service = MockMessageService::new(4000);

        let rewrite = service
            .rewrite(
                RewriteRequest::new("ship it")
                    .with_tone("formal")
                    .with_context("manager"),
            )
            .await
            .unwrap();
        assert_eq!(rewrite.result, "[mock:formal/manager] ship it");
        assert_eq!(rewrite.provider, MOCK_PROVIDER);

        let analysis = service.analyze(AnalyzeRequest::new("ship it")).await.unwrap();
        assert_eq!(analysis.result.tone, Tone::Neutral);
        assert_eq!(analysis.result.score, 47);
        assert_eq!(analysis.result.suggestions.len(), 2);
        assert!(service.info().mock_mode);
    }
}
