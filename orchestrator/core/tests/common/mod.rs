// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Scripted provider adapters shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parley_core::domain::provider::{CallRequest, ProviderAdapter, ProviderError, ProviderId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub enum Script {
    Reply(String),
    Fail(ProviderError),
    /// Reply after sleeping; tests run with paused time
    Delayed(Duration, String),
    Hang,
}

pub struct ScriptedAdapter {
    id: ProviderId,
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(id: ProviderId, script: Script) -> Arc<Self> {
        Arc::new(Self {
            id,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn replying(id: ProviderId, text: &str) -> Arc<Self> {
        Self::new(id, Script::Reply(text.to_string()))
    }

    pub fn failing(id: ProviderId, error: ProviderError) -> Arc<Self> {
        Self::new(id, Script::Fail(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn invoke(&self, _request: &CallRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(error) => Err(error.clone()),
            Script::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Script::Hang => std::future::pending().await,
        }
    }
}

pub fn dyn_adapters(adapters: &[&Arc<ScriptedAdapter>]) -> Vec<Arc<dyn ProviderAdapter>> {
    adapters
        .iter()
        .map(|adapter| Arc::clone(adapter) as Arc<dyn ProviderAdapter>)
        .collect()
}
