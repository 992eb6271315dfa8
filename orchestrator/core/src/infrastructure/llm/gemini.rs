// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gemini LLM Provider Adapter
//
// Anti-Corruption Layer for the Google Generative Language API
// (`models/{model}:generateContent`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::transport::{join_url, non_empty, send_json};
use crate::domain::provider::{
    CallRequest, GenerationSettings, ProviderAdapter, ProviderError, ProviderId,
};

pub struct GeminiAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    settings: GenerationSettings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Serialize)]
struct GeminiRequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiAdapter {
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
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn invoke(&self, request: &CallRequest) -> Result<String, ProviderError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiRequestPart {
                    text: request.prompt(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
                response_mime_type: request
                    .wants_structured_output()
                    .then_some("application/json"),
            },
        };

        let path = format!("v1beta/models/{}:generateContent", self.settings.model);
        let http_request = self
            .client
            .post(join_url(&self.endpoint, &path))
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let response: GeminiResponse = send_json(self.id(), http_request).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        non_empty(text)
    }
}
