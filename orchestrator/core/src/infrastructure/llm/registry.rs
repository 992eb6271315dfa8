// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - Adapter Construction from Configuration
//
// Builds one adapter per provider whose credential resolves at startup.
// Providers without a credential get no adapter; the orchestrator records
// them as Disabled when it reaches them in the order.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::failover::FailoverOrchestrator;
use crate::domain::provider::{ProviderAdapter, ProviderId};
use crate::domain::service_config::{ProviderConfig, ServiceConfig};

use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::openai::OpenAIAdapter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Registry of the adapters that are usable in this process
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Create provider registry from service configuration, resolving
    /// `env:` credentials against the process environment
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        Self::from_config_with(config, |var| std::env::var(var).ok())
    }

    /// Same as `from_config` with an injectable variable source
    pub fn from_config_with(
        config: &ServiceConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        info!("Initializing LLM provider registry");

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let mut adapters = Vec::new();
        for id in ProviderId::ALL {
            let provider_config = config.spec.providers.provider(id);
            let credential_ref = provider_config.credential_ref(id);

            match Self::resolve_api_key(&credential_ref, &lookup) {
                Some(api_key) => {
                    let settings = provider_config.generation_settings(id);
                    info!(
                        provider = %id,
                        model = %settings.model,
                        "Provider enabled"
                    );
                    adapters.push(Self::create_provider(id, provider_config, api_key, client.clone()));
                }
                None => {
                    info!(provider = %id, "No credential configured, provider disabled");
                }
            }
        }

        if adapters.is_empty() && !config.spec.mock_mode {
            warn!("No LLM providers have credentials - every request will fail until one is configured");
        }

        Ok(Self { adapters })
    }

    /// Create a provider instance from configuration
    fn create_provider(
        id: ProviderId,
        config: &ProviderConfig,
        api_key: String,
        client: reqwest::Client,
    ) -> Arc<dyn ProviderAdapter> {
        let endpoint = config.endpoint(id);
        let settings = config.generation_settings(id);

        match id {
            ProviderId::OpenAi => Arc::new(OpenAIAdapter::new(client, endpoint, api_key, settings)),
            ProviderId::Anthropic => {
                Arc::new(AnthropicAdapter::new(client, endpoint, api_key, settings))
            }
            ProviderId::Gemini => Arc::new(GeminiAdapter::new(client, endpoint, api_key, settings)),
        }
    }

    /// Resolve API key from config (supports "env:VAR_NAME" syntax).
    /// Unset or blank values mean the provider has no credential.
    fn resolve_api_key(key: &str, lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
        let value = match key.strip_prefix("env:") {
            Some(var_name) => lookup(var_name.trim())?,
            None => key.to_string(),
        };
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn has_provider(&self, id: ProviderId) -> bool {
        self.adapters.iter().any(|adapter| adapter.id() == id)
    }

    /// Providers with a resolved credential
    pub fn enabled(&self) -> Vec<ProviderId> {
        self.adapters.iter().map(|adapter| adapter.id()).collect()
    }

    /// Build the orchestrator for this registry using the configured order,
    /// strategy and per-attempt deadline
    pub fn orchestrator(&self, config: &ServiceConfig) -> FailoverOrchestrator {
        let providers = &config.spec.providers;
        FailoverOrchestrator::new(
            providers.order.clone(),
            self.adapters.iter().cloned(),
            Duration::from_millis(providers.timeout_ms),
        )
        .with_strategy(providers.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_registry_uses_credential_presence() {
        let mut config = ServiceConfig::default();
        config.spec.providers.gemini.api_key = Some("literal-key".to_string());
        config.spec.providers.anthropic.api_key = Some("env:CUSTOM_ANTHROPIC".to_string());

        let vars = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("CUSTOM_ANTHROPIC", "   "),
        ]);
        let registry =
            ProviderRegistry::from_config_with(&config, |var| vars.get(var).map(|v| v.to_string()))
                .unwrap();

        assert!(registry.has_provider(ProviderId::OpenAi));
        assert!(!registry.has_provider(ProviderId::Anthropic));
        assert!(registry.has_provider(ProviderId::Gemini));
        assert_eq!(registry.enabled(), vec![ProviderId::OpenAi, ProviderId::Gemini]);
    }

    #[test]
    fn test_orchestrator_follows_config() {
        let mut config = ServiceConfig::default();
        config.spec.providers.order = "gemini,openai".parse().unwrap();
        config.spec.providers.timeout_ms = 1234;

        let registry = ProviderRegistry::from_config_with(&config, |var| {
            (var == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap();
        let orchestrator = registry.orchestrator(&config);

        assert_eq!(orchestrator.deadline(), Duration::from_millis(1234));
        assert_eq!(orchestrator.order().to_string(), "gemini,openai");
        assert_eq!(orchestrator.enabled_providers(), vec![ProviderId::OpenAi]);
    }

    #[test]
    fn test_resolve_api_key() {
        let lookup = |var: &str| (var == "SET").then(|| "value".to_string());
        assert_eq!(ProviderRegistry::resolve_api_key("env:SET", &lookup), Some("value".to_string()));
        assert_eq!(ProviderRegistry::resolve_api_key("env:UNSET", &lookup), None);
        assert_eq!(ProviderRegistry::resolve_api_key("", &lookup), None);
        assert_eq!(ProviderRegistry::resolve_api_key("sk-inline", &lookup), Some("sk-inline".to_string()));
    }
}
