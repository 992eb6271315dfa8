// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Parley Core
//!
//! Rewrites and analyzes business messages through an ordered list of LLM
//! providers, failing over when one is disabled, errors or times out.
//!
//! # Architecture
//!
//! - **domain:** requests, provider identities, attempt logs, configuration
//! - **application:** timeout guard, failover orchestrator, normalizer, message service
//! - **infrastructure:** vendor adapters, provider registry, prompt templates
//! - **presentation:** axum HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
