// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Embedded mode execution (when no server is running)
//!
//! Creates the message service in-process and runs requests directly.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

use parley_core::{
    application::message_service::{
        Analysis, MessageService, MockMessageService, Rewrite, StandardMessageService,
    },
    domain::message::{AnalyzeRequest, RewriteRequest},
    domain::service_config::ServiceConfig,
    infrastructure::{llm::ProviderRegistry, prompt_template_engine::PromptTemplateEngine},
};

/// Build the message service described by `config`
pub fn build_service(config: &ServiceConfig) -> Result<Arc<dyn MessageService>> {
    let max_text_chars = config.spec.limits.max_text_chars;

    if config.spec.mock_mode {
        info!("Mock mode enabled, providers will not be called");
        let service =
            MockMessageService::new(max_text_chars).with_strategy(config.spec.providers.strategy);
        return Ok(Arc::new(service));
    }

    let registry =
        ProviderRegistry::from_config(config).context("Failed to initialize LLM providers")?;
    let orchestrator = Arc::new(registry.orchestrator(config));
    let prompts = PromptTemplateEngine::new().context("Failed to load prompt templates")?;

    info!(
        order = %config.spec.providers.order,
        enabled = ?registry.enabled(),
        timeout_ms = config.spec.providers.timeout_ms,
        "Message service ready"
    );
    Ok(Arc::new(StandardMessageService::new(
        orchestrator,
        prompts,
        max_text_chars,
    )))
}

/// Load configuration once for the whole command, discovery included.
///
/// The configured log format is only known after loading, so the loader's
/// own diagnostics go through a temporary subscriber on `writer`.
pub fn load_config<W>(
    config_path: Option<PathBuf>,
    log_level: Option<&str>,
    writer: W,
) -> Result<ServiceConfig>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::with_default(bootstrap, || ServiceConfig::load_or_default(config_path))
        .context("Failed to load configuration")
}

pub struct EmbeddedExecutor {
    service: Arc<dyn MessageService>,
}

impl EmbeddedExecutor {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        config
            .validate()
            .context("Configuration validation failed")?;
        Ok(Self::from_service(build_service(config)?))
    }

    pub fn from_service(service: Arc<dyn MessageService>) -> Self {
        Self { service }
    }

    pub async fn rewrite(&self, request: RewriteRequest) -> Result<Rewrite> {
        Ok(self.service.rewrite(request).await?)
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis> {
        Ok(self.service.analyze(request).await?)
    }
}
