// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Anthropic LLM Provider Adapter
//
// Anti-Corruption Layer for the Anthropic Messages API. The API has no JSON
// response mode, so structured requests rely on the prompt alone.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::{join_url, non_empty, send_json};
use crate::domain::provider::{
    CallRequest, GenerationSettings, ProviderAdapter, ProviderError, ProviderId,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    settings: GenerationSettings,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            settings,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn invoke(&self, request: &CallRequest) -> Result<String, ProviderError> {
        let body = AnthropicRequest {
            model: &self.settings.model,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.prompt(),
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let http_request = self
            .client
            .post(join_url(&self.endpoint, "v1/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response: AnthropicResponse = send_json(self.id(), http_request).await?;

        // Only text blocks carry the answer
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        non_empty(text)
    }
}
