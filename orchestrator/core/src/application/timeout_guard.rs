// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Per-attempt deadline enforcement.
//!
//! The guarded future is polled against a `tokio::time::timeout`. If the
//! deadline fires first the future is dropped, which aborts the underlying
//! HTTP request; its eventual result can therefore never be observed.

use std::future::Future;
use std::time::Duration;

use crate::domain::provider::ProviderError;

pub async fn guard<F>(operation: F, deadline: Duration, label: &str) -> Result<String, ProviderError>
where
    F: Future<Output = Result<String, ProviderError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(
                label = label,
                deadline_ms = deadline.as_millis() as u64,
                "Provider call exceeded deadline"
            );
            Err(ProviderError::Upstream(format!("TIMEOUT_{}", label)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_fast_operation_passes_through() {
        let outcome = guard(
            async { Ok("done".to_string()) },
            Duration::from_millis(100),
            "OPENAI",
        )
        .await;
        assert_eq!(outcome, Ok("done".to_string()));

        let failed = guard(
            async { Err(ProviderError::Empty) },
            Duration::from_millis(100),
            "OPENAI",
        )
        .await;
        assert_eq!(failed, Err(ProviderError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_operation_times_out_at_deadline() {
        let started = Instant::now();
        let outcome = guard(
            async {
                sleep(Duration::from_secs(30)).await;
                Ok("late".to_string())
            },
            Duration::from_millis(250),
            "GEMINI",
        )
        .await;

        assert_eq!(outcome, Err(ProviderError::Upstream("TIMEOUT_GEMINI".into())));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_completion_is_discarded() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let outcome = guard(
            async move {
                sleep(Duration::from_secs(2)).await;
                flag.store(true, Ordering::SeqCst);
                Ok("late".to_string())
            },
            Duration::from_millis(10),
            "ANTHROPIC",
        )
        .await;
        assert!(outcome.is_err());

        // The dropped operation never resumes, even after its own delay passes
        sleep(Duration::from_secs(5)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
