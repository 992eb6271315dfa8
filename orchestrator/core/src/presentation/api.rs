// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP API
//!
//! Routes:
//!
//! - `POST /api/rewrite` → `{"result": "..."}`
//! - `POST /api/analyze` → `{"tone", "score", "suggestions"}`
//! - `GET /health`
//! - `GET /metrics` (Prometheus text, only when a recorder is installed)
//!
//! Both message routes report the answering provider in `x-parley-provider`.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use super::middleware::{cors_layer, rate_limit, security_headers};
use crate::application::message_service::{MessageError, MessageService};
use crate::domain::message::{AnalyzeRequest, RewriteRequest};
use crate::domain::service_config::ServerConfig;

pub const PROVIDER_HEADER: &str = "x-parley-provider";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn MessageService>,
    pub server: ServerConfig,
    pub metrics: Option<PrometheusHandle>,
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<dyn MessageService>, server: ServerConfig) -> Self {
        // 0 requests per minute disables limiting
        let limiter = NonZeroU32::new(server.requests_per_minute)
            .map(|rpm| Arc::new(RateLimiter::direct(Quota::per_minute(rpm))));

        Self {
            service,
            server,
            metrics: None,
            limiter,
            start_time: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn app(state: AppState) -> Router {
    let max_body_bytes = state.server.max_body_bytes;
    let cors = cors_layer(&state.server.cors_origins);

    let message_routes = Router::new()
        .route("/api/rewrite", post(rewrite_handler))
        .route("/api/analyze", post(analyze_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(message_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors);

    security_headers(router).layer(TraceLayer::new_for_http())
}

/// Failures surfaced to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    Message(MessageError),
    InvalidJson(String),
    PayloadTooLarge,
    RateLimited,
}

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        ApiError::Message(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJson(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Message(MessageError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.code() }))
            }
            ApiError::Message(err) => {
                error!(kind = err.kind(), error = %err, "Request failed");
                metrics::counter!("parley_request_failures_total", "kind" => err.kind())
                    .increment(1);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.kind(), "message": err.to_string() }),
                )
            }
            ApiError::InvalidJson(detail) => {
                warn!(detail = %detail, "Rejected malformed request body");
                (StatusCode::BAD_REQUEST, json!({ "error": "INVALID_JSON" }))
            }
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "PAYLOAD_TOO_LARGE" }),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "RATE_LIMITED" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn provider_header(provider: &str) -> [(header::HeaderName, HeaderValue); 1] {
    let value = HeaderValue::from_str(provider).unwrap_or(HeaderValue::from_static("unknown"));
    [(header::HeaderName::from_static(PROVIDER_HEADER), value)]
}

async fn rewrite_handler(
    State(state): State<AppState>,
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let rewrite = state.service.rewrite(request).await?;

    Ok((
        provider_header(&rewrite.provider),
        Json(json!({ "result": rewrite.result })),
    )
        .into_response())
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let analysis = state.service.analyze(request).await?;

    Ok((provider_header(&analysis.provider), Json(analysis.result)).into_response())
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let info = state.service.info();
    Json(json!({
        "status": "ok",
        "mock_mode": info.mock_mode,
        "providers": info.providers,
        "strategy": info.strategy,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
