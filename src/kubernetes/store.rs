// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Collaborator traits the controllers talk to the API server through.
//!
//! `KubeStore` implements all of them over a `kube::Client`; tests swap in an
//! in-memory store or mocks.

use crate::error::Result;
use crate::types::{App, CatalogTemplateVersion, ClusterTemplate, MultiClusterApp, MultiClusterAppRevision};
use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MultiClusterAppStore: Send + Sync {
    async fn get_multicluster_app(&self, namespace: &str, name: &str) -> Result<MultiClusterApp>;

    /// Full update; fails with a conflict when the resource version is stale
    async fn update_multicluster_app(&self, mcapp: &MultiClusterApp) -> Result<MultiClusterApp>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RevisionStore: Send + Sync {
    async fn get_revision(&self, namespace: &str, name: &str) -> Result<MultiClusterAppRevision>;

    async fn create_revision(
        &self,
        revision: &MultiClusterAppRevision,
    ) -> Result<MultiClusterAppRevision>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppStore: Send + Sync {
    async fn get_app(&self, namespace: &str, name: &str) -> Result<Option<App>>;

    /// List Apps in a project namespace matching a label selector
    async fn list_apps(&self, namespace: &str, label_selector: &str) -> Result<Vec<App>>;

    async fn create_app(&self, app: &App) -> Result<App>;

    async fn update_app(&self, app: &App) -> Result<App>;

    /// Fails with not-found when the App is already gone
    async fn delete_app(&self, namespace: &str, name: &str) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_template_version(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CatalogTemplateVersion>>;
}

/// Clusters and their projects, used to find Apps outside the current targets
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TopologyStore: Send + Sync {
    async fn list_cluster_names(&self) -> Result<Vec<String>>;

    /// Names of the projects of a cluster, which are also their namespaces
    async fn list_project_names(&self, cluster_name: &str) -> Result<Vec<String>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RbacStore: Send + Sync {
    async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>>;
    async fn create_role(&self, role: &Role) -> Result<Role>;
    async fn update_role(&self, role: &Role) -> Result<Role>;
    async fn delete_role(&self, namespace: &str, name: &str) -> Result<()>;

    async fn get_role_binding(&self, namespace: &str, name: &str) -> Result<Option<RoleBinding>>;
    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding>;
    async fn update_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding>;
    async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Find the user owning `principal_id`, creating it when none exists.
    /// Returns the user's name.
    async fn ensure_user(&self, principal_id: &str, display_name: &str) -> Result<String>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SharedResourceStore: Send + Sync {
    async fn get_cluster_template(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ClusterTemplate>>;
}

/// Every collaborator, usually all backed by the same store
#[derive(Clone)]
pub struct Collaborators {
    pub mcapps: Arc<dyn MultiClusterAppStore>,
    pub revisions: Arc<dyn RevisionStore>,
    pub apps: Arc<dyn AppStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub topology: Arc<dyn TopologyStore>,
    pub rbac: Arc<dyn RbacStore>,
    pub users: Arc<dyn UserManager>,
    pub shared: Arc<dyn SharedResourceStore>,
}

impl Collaborators {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: MultiClusterAppStore
            + RevisionStore
            + AppStore
            + CatalogStore
            + TopologyStore
            + RbacStore
            + UserManager
            + SharedResourceStore
            + 'static,
    {
        Self {
            mcapps: store.clone(),
            revisions: store.clone(),
            apps: store.clone(),
            catalog: store.clone(),
            topology: store.clone(),
            rbac: store.clone(),
            users: store.clone(),
            shared: store,
        }
    }
}
