// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct IntervalData {
    started: Instant,
    interval: Duration,
}

/// Rolling update intervals in progress, keyed by MultiClusterApp name.
#[derive(Debug, Default)]
pub struct IntervalTracker {
    entries: Mutex<HashMap<String, IntervalData>>,
}

impl IntervalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a batch that must wait `interval` before the next one
    pub fn store(&self, name: &str, interval: Duration) {
        self.lock().insert(
            name.to_string(),
            IntervalData {
                started: Instant::now(),
                interval,
            },
        );
    }

    /// Time left until the next batch may start; `None` when untracked or elapsed
    pub fn remaining(&self, name: &str) -> Option<Duration> {
        let data = *self.lock().get(name)?;
        data.interval
            .checked_sub(data.started.elapsed())
            .filter(|left| !left.is_zero())
    }

    pub fn delete(&self, name: &str) {
        self.lock().remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, IntervalData>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_is_bounded_by_interval() {
        let tracker = IntervalTracker::new();
        tracker.store("wordpress", Duration::from_secs(30));

        let left = tracker.remaining("wordpress").unwrap();
        assert!(left <= Duration::from_secs(30));
        assert!(left > Duration::from_secs(25));
    }

    #[test]
    fn test_untracked_and_elapsed_have_no_remaining() {
        let tracker = IntervalTracker::new();
        assert!(tracker.remaining("wordpress").is_none());

        tracker.store("wordpress", Duration::ZERO);
        assert!(tracker.contains("wordpress"));
        assert!(tracker.remaining("wordpress").is_none());
    }

    #[test]
    fn test_delete_forgets_only_that_name() {
        let tracker = IntervalTracker::new();
        tracker.store("wordpress", Duration::from_secs(30));
        tracker.store("grafana", Duration::from_secs(30));

        tracker.delete("wordpress");

        assert!(!tracker.contains("wordpress"));
        assert!(tracker.contains("grafana"));
    }
}
