// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys
pub mod annotations {
    /// User who created a resource; seeds the owner access tier
    pub const CREATOR_ID: &str = "field.cattle.io/creatorId";
}

/// Kubernetes label keys
pub mod labels {
    /// Set on every App created for a MultiClusterApp, value is the MultiClusterApp name
    pub const MULTI_CLUSTER_APP_ID: &str = "mcapp";
    /// Set on MultiClusterAppRevisions, value is the MultiClusterApp name
    pub const MULTI_CLUSTER_APP_REVISION: &str = "io.cattle.field/multiClusterAppId";
}

/// Namespace holding global Rancher resources
pub const GLOBAL_NAMESPACE: &str = "cattle-global-data";

/// The operator name used as field manager
pub const OPERATOR_NAME: &str = "mcapp-controller";

/// Finalizer guarding child App cleanup of a MultiClusterApp
pub const MCAPP_FINALIZER: &str = "controller.cattle.io/multi-cluster-app-controller";

/// Scope key of answers that apply to every target
pub const GLOBAL_SCOPE_ANSWERS_KEY: &str = "global";

/// Message of the Installed condition while a rolling upgrade is in progress
pub const UPGRADING_MESSAGE: &str = "upgrading";

/// Prefix used for generated MultiClusterAppRevision names
pub const REVISION_GENERATE_NAME: &str = "mcapprevision-";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
