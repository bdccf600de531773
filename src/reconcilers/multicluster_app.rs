// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! MultiClusterApp reconciler - rolls MultiClusterApps out to their target projects
//! and keeps their member RBAC in sync.

use crate::config::Config;
use crate::constants::{labels::MULTI_CLUSTER_APP_ID, MCAPP_FINALIZER};
use crate::error::{Error, Result};
use crate::kubernetes::store::SharedResourceStore;
use crate::kubernetes::Collaborators;
use crate::mcapp::McAppManager;
use crate::rbac::RoleSynthesizer;
use crate::reconcilers::shared_resource::sync_member_roles;
use crate::types::{App, MultiClusterApp};
use futures::StreamExt;
use kube_runtime::watcher::Config as WatcherConfig;
use kube::{
    runtime::{
        controller::Action,
        finalizer::{finalizer, Event},
        reflector::ObjectRef,
        Controller,
    },
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct MultiClusterAppReconciler {
    client: Client,
    config: Config,
    manager: McAppManager,
    roles: RoleSynthesizer,
    shared: Arc<dyn SharedResourceStore>,
}

impl MultiClusterAppReconciler {
    pub fn new(
        client: Client,
        config: Config,
        stores: Collaborators,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            roles: RoleSynthesizer::new(stores.rbac.clone(), stores.users.clone()),
            shared: stores.shared.clone(),
            manager: McAppManager::new(stores, &config, cancel),
            config,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let mcapps: Api<MultiClusterApp> =
            Api::namespaced(self.client.clone(), &self.config.global_namespace);
        let apps: Api<App> = Api::all(self.client.clone());
        let global_namespace = self.config.global_namespace.clone();
        let context = Arc::new(self);

        info!("Starting MultiClusterApp reconciler in {}", global_namespace);
        Controller::new(mcapps, WatcherConfig::default())
            .watches(
                apps,
                WatcherConfig::default().labels(MULTI_CLUSTER_APP_ID),
                move |app: App| {
                    app.labels()
                        .get(MULTI_CLUSTER_APP_ID)
                        .map(|name| ObjectRef::new(name).within(&global_namespace))
                },
            )
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled multiclusterapp: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    async fn apply(&self, mcapp: &MultiClusterApp) -> Result<Action> {
        let name = mcapp.name_any();
        let outcome = self.manager.sync(&name, Some(mcapp)).await?;

        let current = outcome.object.as_ref().unwrap_or(mcapp);
        sync_member_roles(current, &self.roles, self.shared.as_ref()).await?;

        Ok(match outcome.requeue_after {
            Some(delay) => {
                debug!("Rolling update of {} waits {:?}", name, delay);
                Action::requeue(delay)
            }
            None => Action::await_change(),
        })
    }

    async fn cleanup(&self, mcapp: &MultiClusterApp) -> Result<Action> {
        self.manager.sync(&mcapp.name_any(), Some(mcapp)).await?;
        Ok(Action::await_change())
    }
}

async fn reconcile(
    mcapp: Arc<MultiClusterApp>,
    ctx: Arc<MultiClusterAppReconciler>,
) -> Result<Action> {
    let namespace = mcapp
        .namespace()
        .unwrap_or_else(|| ctx.config.global_namespace.clone());
    let api: Api<MultiClusterApp> = Api::namespaced(ctx.client.clone(), &namespace);

    debug!("Reconciling multiclusterapp: {}", mcapp.name_any());
    finalizer(&api, MCAPP_FINALIZER, mcapp, |event| async {
        match event {
            Event::Apply(mcapp) => ctx.apply(&mcapp).await,
            Event::Cleanup(mcapp) => ctx.cleanup(&mcapp).await,
        }
    })
    .await
    .map_err(|e| Error::FinalizerError(Box::new(e)))
}

fn error_policy(
    mcapp: Arc<MultiClusterApp>,
    error: &Error,
    ctx: Arc<MultiClusterAppReconciler>,
) -> Action {
    error!(
        "Reconciliation error for multiclusterapp {}: {}",
        mcapp.name_any(),
        error
    );
    Action::requeue(ctx.config.error_requeue)
}
