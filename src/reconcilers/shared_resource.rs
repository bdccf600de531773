// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Member RBAC reconciler for shared global resources.

use crate::config::Config;
use crate::constants::annotations::CREATOR_ID;
use crate::error::{Error, Result};
use crate::kubernetes::store::SharedResourceStore;
use crate::kubernetes::Collaborators;
use crate::rbac::{RbacTarget, RoleSynthesizer, SharedResourceKind};
use crate::types::{
    ClusterTemplate, ClusterTemplateRevision, GlobalDns, GlobalDnsProvider, Member,
    MultiClusterApp, NodeTemplate,
};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A resource whose members are granted access tiers on it
pub trait SharedResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    const KIND: SharedResourceKind;

    /// Watch only the global namespace instead of every namespace
    const GLOBAL_ONLY: bool = false;

    fn members(&self) -> &[Member] {
        &[]
    }

    /// `<namespace>:<name>` of a ClusterTemplate whose members apply instead of our own
    fn parent_template(&self) -> Option<&str> {
        None
    }

    /// Whether this object takes part in member RBAC at all
    fn is_shared(&self) -> bool {
        true
    }
}

impl SharedResource for MultiClusterApp {
    const KIND: SharedResourceKind = SharedResourceKind::MultiClusterApp;

    fn members(&self) -> &[Member] {
        &self.spec.members
    }
}

impl SharedResource for GlobalDns {
    const KIND: SharedResourceKind = SharedResourceKind::GlobalDns;

    fn members(&self) -> &[Member] {
        &self.spec.members
    }
}

impl SharedResource for GlobalDnsProvider {
    const KIND: SharedResourceKind = SharedResourceKind::GlobalDnsProvider;

    fn members(&self) -> &[Member] {
        &self.spec.members
    }
}

impl SharedResource for ClusterTemplate {
    const KIND: SharedResourceKind = SharedResourceKind::ClusterTemplate;

    fn members(&self) -> &[Member] {
        &self.spec.members
    }
}

impl SharedResource for ClusterTemplateRevision {
    const KIND: SharedResourceKind = SharedResourceKind::ClusterTemplateRevision;

    fn parent_template(&self) -> Option<&str> {
        Some(self.spec.cluster_template_name.as_str())
    }
}

// Node templates are private to their creator
impl SharedResource for NodeTemplate {
    const KIND: SharedResourceKind = SharedResourceKind::NodeTemplate;
}

// Cloud credentials are Secrets in the global namespace carrying a creator
impl SharedResource for Secret {
    const KIND: SharedResourceKind = SharedResourceKind::CloudCredential;
    const GLOBAL_ONLY: bool = true;

    fn is_shared(&self) -> bool {
        self.annotations().contains_key(CREATOR_ID)
    }
}

/// Grant the access tiers of `obj` to its members and its creator
pub async fn sync_member_roles<R: SharedResource>(
    obj: &R,
    roles: &RoleSynthesizer,
    shared: &dyn SharedResourceStore,
) -> Result<()> {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();
    let creator_id = obj
        .annotations()
        .get(CREATOR_ID)
        .ok_or_else(|| Error::MissingCreatorId {
            kind: R::kind(&()).to_string(),
            name: name.clone(),
        })?;

    let parent_members;
    let members = match obj.parent_template() {
        Some(qualified) => {
            let (template_ns, template_name) = qualified
                .split_once(':')
                .ok_or_else(|| Error::InvalidClusterTemplateName(qualified.to_string()))?;
            let template = shared
                .get_cluster_template(template_ns, template_name)
                .await?
                .ok_or_else(|| Error::ClusterTemplateNotFound(qualified.to_string()))?;
            parent_members = template.spec.members;
            parent_members.as_slice()
        }
        None => obj.members(),
    };

    let uid = obj.uid().unwrap_or_default();
    roles
        .create_role_and_role_binding(&RbacTarget {
            kind: R::KIND,
            name: &name,
            namespace: &namespace,
            uid: &uid,
            creator_id,
            members,
        })
        .await
}

pub struct SharedResourceReconciler<R> {
    client: Client,
    roles: RoleSynthesizer,
    shared: Arc<dyn SharedResourceStore>,
    global_namespace: String,
    error_requeue: Duration,
    _resource: PhantomData<fn() -> R>,
}

impl<R: SharedResource> SharedResourceReconciler<R> {
    pub fn new(client: Client, config: &Config, stores: &Collaborators) -> Self {
        Self {
            client,
            roles: RoleSynthesizer::new(stores.rbac.clone(), stores.users.clone()),
            shared: stores.shared.clone(),
            global_namespace: config.global_namespace.clone(),
            error_requeue: config.error_requeue,
            _resource: PhantomData,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let resources: Api<R> = if R::GLOBAL_ONLY {
            Api::namespaced(self.client.clone(), &self.global_namespace)
        } else {
            Api::all(self.client.clone())
        };
        let context = Arc::new(self);

        info!("Starting {} RBAC reconciler", R::kind(&()));
        Controller::new(resources, watcher::Config::default())
            .shutdown_on_signal()
            .run(reconcile::<R>, error_policy::<R>, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled {}: {:?}", R::kind(&()), o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile<R: SharedResource>(
    obj: Arc<R>,
    ctx: Arc<SharedResourceReconciler<R>>,
) -> Result<Action> {
    if obj.meta().deletion_timestamp.is_some() {
        // Roles and bindings are owner-referenced and collected with the resource
        return Ok(Action::await_change());
    }
    if !obj.is_shared() {
        return Ok(Action::await_change());
    }

    debug!("Reconciling {} {}", R::kind(&()), obj.name_any());
    sync_member_roles(obj.as_ref(), &ctx.roles, ctx.shared.as_ref()).await?;
    Ok(Action::await_change())
}

fn error_policy<R: SharedResource>(
    obj: Arc<R>,
    error: &Error,
    ctx: Arc<SharedResourceReconciler<R>>,
) -> Action {
    error!("Reconciliation error for {} {}: {}", R::kind(&()), obj.name_any(), error);
    Action::requeue(ctx.error_requeue)
}
