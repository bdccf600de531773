// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::GLOBAL_NAMESPACE;
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace holding MultiClusterApps, their revisions and other global resources
    pub global_namespace: String,
    /// Attempts made after an update first hits a conflict
    pub conflict_retry_attempts: u32,
    /// Initial delay between conflict retries
    pub conflict_retry_delay: Duration,
    /// Requeue delay after a failed reconcile
    pub error_requeue: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global_namespace: GLOBAL_NAMESPACE.to_string(),
            conflict_retry_attempts: 5,
            conflict_retry_delay: Duration::from_millis(5),
            error_requeue: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let global_namespace =
            env::var("GLOBAL_NAMESPACE").unwrap_or(defaults.global_namespace);
        let conflict_retry_attempts =
            parse_var("CONFLICT_RETRY_ATTEMPTS")?.unwrap_or(defaults.conflict_retry_attempts);
        let conflict_retry_delay = parse_var("CONFLICT_RETRY_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.conflict_retry_delay);
        let error_requeue = parse_var("ERROR_REQUEUE_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.error_requeue);

        Ok(Config {
            global_namespace,
            conflict_retry_attempts,
            conflict_retry_delay,
            error_requeue,
        })
    }

    /// Retry policy for optimistic concurrency conflicts
    pub fn conflict_retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.conflict_retry_attempts,
            initial_delay: self.conflict_retry_delay,
            ..RetryConfig::default()
        }
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(None),
    }
}
