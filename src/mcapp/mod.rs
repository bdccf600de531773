// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! MultiClusterApp rollout: per-project Apps, batched rolling updates and revisions.

mod cleanup;
pub mod interval;
pub mod manager;
mod revision;
pub mod rollout;

pub use interval::IntervalTracker;
pub use manager::{McAppManager, SyncOutcome};
