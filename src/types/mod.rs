// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed Rancher resources.

pub mod app;
pub mod condition;
pub mod management;
pub mod multicluster_app;
pub mod shared;

pub use app::{App, AppSpec, AppStatus};
pub use condition::{Condition, ConditionType, HasConditions, DEPLOYED, INSTALLED};
pub use management::{CatalogTemplateVersion, Cluster, Project, User};
pub use multicluster_app::{
    Answer, Member, MultiClusterApp, MultiClusterAppRevision, MultiClusterAppSpec,
    MultiClusterAppStatus, RollingUpdate, Target, UpgradeStrategy,
};
pub use shared::{ClusterTemplate, ClusterTemplateRevision, GlobalDns, GlobalDnsProvider, NodeTemplate};
