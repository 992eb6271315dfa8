// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod failover;
pub mod message_service;
pub mod normalizer;
pub mod timeout_guard;

// Re-export use cases for convenience
pub use failover::{FailoverOrchestrator, OrchestrationError};
pub use message_service::{
    Analysis, MessageError, MessageService, MockMessageService, Rewrite, ServiceInfo,
    StandardMessageService,
};
