// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration Types
//
// Defines the configuration schema for a Parley service process, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP server settings
// - Provider order, failover strategy and per-attempt deadline
// - Per-provider credentials, endpoints and generation parameters
// - Mock mode and observability settings
//
// The configuration is read once at startup and shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::provider::{GenerationSettings, ProviderId, ProviderOrder};

pub const API_VERSION: &str = "parley/v1";
pub const KIND: &str = "ServiceConfig";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Top-level Kubernetes-style service configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// API version (must be "parley/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ServiceConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: ServiceConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    /// Return canned output without calling any provider
    #[serde(default)]
    pub mock_mode: bool,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Process-wide request budget; 0 disables rate limiting
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// How the orchestrator walks the provider order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailoverStrategy {
    /// Try one provider at a time, in order
    #[default]
    Sequential,
    /// Start every provider at once, first success wins
    Race,
}

impl std::str::FromStr for FailoverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(FailoverStrategy::Sequential),
            "race" => Ok(FailoverStrategy::Race),
            other => Err(format!("unknown failover strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_order")]
    pub order: ProviderOrder,

    #[serde(default)]
    pub strategy: FailoverStrategy,

    /// Deadline applied to every single provider call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    #[serde(default)]
    pub gemini: ProviderConfig,
}

/// Per-provider settings. Unset fields fall back to the provider's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ProviderConfig {
    pub fn credential_ref(&self, id: ProviderId) -> String {
        self.api_key
            .clone()
            .unwrap_or_else(|| format!("env:{}", default_api_key_var(id)))
    }

    pub fn endpoint(&self, id: ProviderId) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(id).to_string())
    }

    pub fn generation_settings(&self, id: ProviderId) -> GenerationSettings {
        GenerationSettings {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| default_model(id).to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

const DEFAULT_MAX_TOKENS: u32 = 600;
const DEFAULT_TEMPERATURE: f32 = 0.4;

pub fn default_api_key_var(id: ProviderId) -> &'static str {
    match id {
        ProviderId::OpenAi => "OPENAI_API_KEY",
        ProviderId::Anthropic => "ANTHROPIC_API_KEY",
        ProviderId::Gemini => "GEMINI_API_KEY",
    }
}

pub fn default_endpoint(id: ProviderId) -> &'static str {
    match id {
        ProviderId::OpenAi => "https://api.openai.com/v1",
        ProviderId::Anthropic => "https://api.anthropic.com",
        ProviderId::Gemini => "https://generativelanguage.googleapis.com",
    }
}

pub fn default_model(id: ProviderId) -> &'static str {
    match id {
        ProviderId::OpenAi => "gpt-4o-mini",
        ProviderId::Anthropic => "claude-3-5-haiku-latest",
        ProviderId::Gemini => "gemini-1.5-flash",
    }
}

// Default value functions
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_body_bytes() -> usize {
    16 * 1024
}

fn default_order() -> ProviderOrder {
    ProviderOrder::new(ProviderId::ALL)
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_text_chars() -> usize {
    4000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            cors_origins: vec![],
            requests_per_minute: default_requests_per_minute(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            strategy: FailoverStrategy::Sequential,
            timeout_ms: default_timeout_ms(),
            openai: ProviderConfig::default(),
            anthropic: ProviderConfig::default(),
            gemini: ProviderConfig::default(),
        }
    }
}

impl ProvidersConfig {
    pub fn provider(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::Gemini => &self.gemini,
        }
    }

    pub fn provider_mut(&mut self, id: ProviderId) -> &mut ProviderConfig {
        match id {
            ProviderId::OpenAi => &mut self.openai,
            ProviderId::Anthropic => &mut self.anthropic,
            ProviderId::Gemini => &mut self.gemini,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Text,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "parley".to_string(),
                labels: None,
            },
            spec: ServiceConfigSpec::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. PARLEY_CONFIG_PATH environment variable
    /// 2. ./parley-config.yaml (working directory)
    /// 3. ~/.parley/config.yaml (user home)
    /// 4. /etc/parley/config.yaml (system, Unix) or C:\ProgramData\Parley\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PARLEY_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./parley-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".parley").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/parley/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Parley\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    /// This allows container deployments to override config via env vars
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as `apply_env_overrides` with an injectable variable source
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("PARLEY_PROVIDER_ORDER") {
            match val.parse::<ProviderOrder>() {
                Ok(order) => {
                    tracing::info!("Environment override: PARLEY_PROVIDER_ORDER={}", order);
                    self.spec.providers.order = order;
                }
                Err(e) => {
                    tracing::warn!("Invalid value for PARLEY_PROVIDER_ORDER: {}. Ignoring.", e);
                }
            }
        }

        if let Some(val) = lookup("PARLEY_TIMEOUT_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => {
                    tracing::info!("Environment override: PARLEY_TIMEOUT_MS={}", ms);
                    self.spec.providers.timeout_ms = ms;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for PARLEY_TIMEOUT_MS: '{}'. Expected positive integer. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Some(val) = lookup("PARLEY_STRATEGY") {
            match val.parse::<FailoverStrategy>() {
                Ok(strategy) => {
                    tracing::info!("Environment override: PARLEY_STRATEGY={:?}", strategy);
                    self.spec.providers.strategy = strategy;
                }
                Err(e) => tracing::warn!("Invalid value for PARLEY_STRATEGY: {}. Ignoring.", e),
            }
        }

        if let Some(val) = lookup("PARLEY_MOCK_MODE") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => {
                    tracing::info!("Environment override: PARLEY_MOCK_MODE=true");
                    self.spec.mock_mode = true;
                }
                "false" | "0" | "no" | "off" => {
                    tracing::info!("Environment override: PARLEY_MOCK_MODE=false");
                    self.spec.mock_mode = false;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for PARLEY_MOCK_MODE: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }

        for id in ProviderId::ALL {
            let key = format!("PARLEY_{}_MODEL", id.timeout_label());
            if let Some(model) = lookup(&key).filter(|m| !m.trim().is_empty()) {
                tracing::info!("Environment override: {}={}", key, model);
                self.spec.providers.provider_mut(id).model = Some(model.trim().to_string());
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let providers = &self.spec.providers;
        if providers.timeout_ms == 0 {
            anyhow::bail!("spec.providers.timeout_ms must be greater than zero");
        }

        for id in ProviderId::ALL {
            let provider = providers.provider(id);
            let settings = provider.generation_settings(id);

            if provider.endpoint(id).trim().is_empty() {
                anyhow::bail!("Endpoint cannot be empty for provider: {}", id);
            }
            if settings.model.trim().is_empty() {
                anyhow::bail!("Model cannot be empty for provider: {}", id);
            }
            if settings.max_tokens == 0 {
                anyhow::bail!("max_tokens must be greater than zero for provider: {}", id);
            }
            if !(0.0..=2.0).contains(&settings.temperature) {
                anyhow::bail!(
                    "temperature must be within [0, 2] for provider: {} (got {})",
                    id,
                    settings.temperature
                );
            }
        }

        if self.spec.limits.max_text_chars == 0 {
            anyhow::bail!("spec.limits.max_text_chars must be greater than zero");
        }

        if self.spec.server.max_body_bytes == 0 {
            anyhow::bail!("spec.server.max_body_bytes must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_version, "parley/v1");
        assert_eq!(config.kind, "ServiceConfig");
        assert_eq!(config.spec.providers.order.len(), 3);
        assert_eq!(config.spec.providers.timeout_ms, 15_000);
        assert_eq!(config.spec.providers.strategy, FailoverStrategy::Sequential);
        assert!(!config.spec.mock_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_yaml_fills_defaults() {
        let yaml = r#"
apiVersion: parley/v1
kind: ServiceConfig
metadata:
  name: test
spec:
  providers:
    order: [gemini, openai, gemini]
    timeout_ms: 2500
    gemini:
      model: gemini-2.0-flash
      temperature: 0.1
"#;
        let config = ServiceConfig::from_yaml_str(yaml).unwrap();
        let providers = &config.spec.providers;
        assert_eq!(providers.order.to_string(), "gemini,openai");
        assert_eq!(providers.timeout_ms, 2500);

        let gemini = providers.gemini.generation_settings(ProviderId::Gemini);
        assert_eq!(gemini.model, "gemini-2.0-flash");
        assert_eq!(gemini.max_tokens, 600);
        assert!((gemini.temperature - 0.1).abs() < f32::EPSILON);

        assert_eq!(
            providers.openai.credential_ref(ProviderId::OpenAi),
            "env:OPENAI_API_KEY"
        );
        assert_eq!(
            providers.anthropic.endpoint(ProviderId::Anthropic),
            "https://api.anthropic.com"
        );
        assert_eq!(config.spec.server.port, 8080);
    }

    #[test]
    fn test_unknown_provider_in_order_is_rejected() {
        let yaml = r#"
apiVersion: parley/v1
kind: ServiceConfig
metadata: { name: test }
spec:
  providers:
    order: [openai, mistral]
"#;
        assert!(ServiceConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        let vars = HashMap::from([
            ("PARLEY_PROVIDER_ORDER", "anthropic"),
            ("PARLEY_TIMEOUT_MS", "750"),
            ("PARLEY_STRATEGY", "race"),
            ("PARLEY_MOCK_MODE", "yes"),
            ("PARLEY_OPENAI_MODEL", "gpt-4.1-mini"),
        ]);
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        let providers = &config.spec.providers;
        assert_eq!(providers.order.to_string(), "anthropic");
        assert_eq!(providers.timeout_ms, 750);
        assert_eq!(providers.strategy, FailoverStrategy::Race);
        assert!(config.spec.mock_mode);
        assert_eq!(providers.openai.model.as_deref(), Some("gpt-4.1-mini"));
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let mut config = ServiceConfig::default();
        let vars = HashMap::from([
            ("PARLEY_PROVIDER_ORDER", "openai,unknown"),
            ("PARLEY_TIMEOUT_MS", "0"),
            ("PARLEY_MOCK_MODE", "maybe"),
        ]);
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.spec.providers.order.len(), 3);
        assert_eq!(config.spec.providers.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!config.spec.mock_mode);
    }

    #[test]
    fn test_validation() {
        let mut config = ServiceConfig::default();

        config.api_version = "wrong/v1".to_string();
        assert!(config.validate().is_err());
        config.api_version = API_VERSION.to_string();

        config.spec.providers.timeout_ms = 0;
        assert!(config.validate().is_err());
        config.spec.providers.timeout_ms = 1000;

        config.spec.providers.anthropic.temperature = Some(3.5);
        assert!(config.validate().is_err());
        config.spec.providers.anthropic.temperature = None;

        config.spec.providers.gemini.model = Some("  ".to_string());
        assert!(config.validate().is_err());
        config.spec.providers.gemini.model = None;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = ServiceConfig::default();
        config.spec.providers.openai.api_key = Some("env:MY_KEY".to_string());
        config.spec.mock_mode = true;

        let yaml = config.to_yaml_string().unwrap();
        let parsed = ServiceConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.spec.providers.openai.api_key.as_deref(), Some("env:MY_KEY"));
        assert!(parsed.spec.mock_mode);
        assert_eq!(parsed.spec.providers.order, config.spec.providers.order);
    }
}
