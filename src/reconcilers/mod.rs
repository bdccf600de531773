// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod multicluster_app;
pub mod shared_resource;

pub use multicluster_app::MultiClusterAppReconciler;
pub use shared_resource::{SharedResource, SharedResourceReconciler};
