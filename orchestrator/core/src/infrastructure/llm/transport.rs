// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Shared HTTP plumbing for the vendor adapters.
//
// Vendor modules only describe request/response shapes; sending, status
// mapping and body decoding are done once here so every adapter reports
// failures the same way.

use serde::de::DeserializeOwned;

use crate::domain::provider::{ProviderError, ProviderId};

const BODY_EXCERPT_CHARS: usize = 200;

/// Send a prepared request and decode a successful JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| {
        tracing::debug!(provider = %provider, "Transport error: {}", e);
        ProviderError::Upstream(format!("request failed: {}", e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.trim().chars().take(BODY_EXCERPT_CHARS).collect();
        return Err(ProviderError::Upstream(format!("HTTP {}: {}", status, excerpt)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Upstream(format!("invalid response body: {}", e)))
}

/// Trim extracted text; nothing left means the vendor gave us nothing usable.
pub(crate) fn non_empty(text: String) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ProviderError::Empty)
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn join_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path.trim_start_matches('/'))
}
