// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Types shared by every layer: provider contract, attempt records,
//! analysis results, inbound requests and service configuration.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod analysis;
pub mod attempt;
pub mod message;
pub mod provider;
pub mod service_config;
