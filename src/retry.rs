// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Retry of optimistic-concurrency conflicts with exponential backoff and jitter.
//!
//! Callers pass an operation that re-reads the latest object, re-applies only the
//! fields they own and writes it back. Only conflicts are retried; every other
//! error is returned immediately.

use crate::error::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, at least one attempt is always made
    pub max_attempts: u32,
    /// Delay after the first conflict
    pub initial_delay: Duration,
    /// Upper bound for the delay between attempts
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-conflict error, runs out of
/// attempts or `cancel` fires. The last conflict is returned when attempts run out.
pub async fn retry_on_conflict<F, Fut, T>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    let mut delay = config.initial_delay;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled(operation_name.to_string()));
        }
        attempt += 1;

        let err = match operation().await {
            Err(e) if e.is_conflict() => e,
            other => return other,
        };

        if attempt >= config.max_attempts.max(1) {
            warn!(
                operation = %operation_name,
                attempt,
                error = %err,
                "Conflict persisted after max retries"
            );
            return Err(err);
        }

        // Jitter: 0.5x to 1.5x of the delay
        let jitter = rand::rng().random_range(0.5..1.5);
        let jittered = Duration::from_secs_f64(delay.as_secs_f64() * jitter);
        debug!(
            operation = %operation_name,
            attempt,
            delay_us = jittered.as_micros() as u64,
            "Conflict, retrying"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::Cancelled(operation_name.to_string()));
            }
            _ = tokio::time::sleep(jittered) => {}
        }

        delay = Duration::from_secs_f64(
            (delay.as_secs_f64() * config.backoff_multiplier).min(config.max_delay.as_secs_f64()),
        );
    }
}
