// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI chat completions API.
// Also works with OpenAI-compatible gateways via a custom endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::{join_url, non_empty, send_json};
use crate::domain::provider::{
    CallRequest, GenerationSettings, ProviderAdapter, ProviderError, ProviderId,
};

pub struct OpenAIAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    settings: GenerationSettings,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

impl OpenAIAdapter {
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
impl ProviderAdapter for OpenAIAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    async fn invoke(&self, request: &CallRequest) -> Result<String, ProviderError> {
        let body = OpenAIRequest {
            model: &self.settings.model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: request.prompt(),
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            response_format: request
                .wants_structured_output()
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let http_request = self
            .client
            .post(join_url(&self.endpoint, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: OpenAIResponse = send_json(self.id(), http_request).await?;

        // Translate OpenAI's response to plain text
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        non_empty(text)
    }
}
