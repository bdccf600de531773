// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of child Apps, found through the `mcapp` label rather than owner references.

use crate::answers::split_project_name;
use crate::constants::labels::MULTI_CLUSTER_APP_ID;
use crate::error::Result;
use crate::mcapp::manager::McAppManager;
use crate::types::{App, MultiClusterApp};
use futures::future::join_all;
use kube::ResourceExt;
use std::collections::HashSet;
use tracing::{debug, warn};

impl McAppManager {
    /// Delete every App labeled for `mcapp_name`, in any project of any cluster
    pub(crate) async fn delete_apps(&self, mcapp_name: &str) -> Result<()> {
        let apps = self.get_all_apps(mcapp_name).await?;
        debug!("Deleting {} apps of {}", apps.len(), mcapp_name);
        self.delete(&apps).await
    }

    async fn get_all_apps(&self, mcapp_name: &str) -> Result<Vec<App>> {
        let selector = format!("{}={}", MULTI_CLUSTER_APP_ID, mcapp_name);
        let mut apps = Vec::new();

        for cluster in self.stores.topology.list_cluster_names().await? {
            for project in self.stores.topology.list_project_names(&cluster).await? {
                apps.extend(self.stores.apps.list_apps(&project, &selector).await?);
            }
        }
        Ok(apps)
    }

    /// Delete Apps of this MultiClusterApp living outside its targets' projects
    pub(crate) async fn reconcile_targets_for_delete(&self, mcapp: &MultiClusterApp) -> Result<()> {
        let mut target_namespaces = HashSet::new();
        for target in &mcapp.spec.targets {
            let (_, project_ns) = split_project_name(&target.project_name)?;
            target_namespaces.insert(project_ns);
        }

        let to_delete: Vec<App> = self
            .get_all_apps(&mcapp.name_any())
            .await?
            .into_iter()
            .filter(|app| {
                let namespace = app.metadata.namespace.as_deref().unwrap_or_default();
                !target_namespaces.contains(namespace)
            })
            .collect();

        if !to_delete.is_empty() {
            debug!(
                "Deleting apps of removed targets of {}: {:?}",
                mcapp.name_any(),
                to_delete.iter().map(|a| a.name_any()).collect::<Vec<_>>()
            );
        }
        self.delete(&to_delete).await
    }

    /// Delete all `apps` concurrently. Every deletion is attempted; an App that is
    /// already gone counts as deleted and the first failure is returned.
    async fn delete(&self, apps: &[App]) -> Result<()> {
        let deletions = apps.iter().map(|app| async move {
            let namespace = app.metadata.namespace.as_deref().unwrap_or_default();
            let name = app.name_any();
            match self.stores.apps.delete_app(namespace, &name).await {
                Err(e) if e.is_not_found() => Ok(()),
                Err(e) => {
                    warn!("Failed to delete app {}/{}: {}", namespace, name, e);
                    Err(e)
                }
                Ok(()) => Ok(()),
            }
        });

        join_all(deletions).await.into_iter().collect()
    }
}
