// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    annotations::CREATOR_ID, labels::MULTI_CLUSTER_APP_REVISION, REVISION_GENERATE_NAME,
};
use crate::error::Result;
use crate::mcapp::manager::{set_installed_done, McAppManager};
use crate::types::{MultiClusterApp, MultiClusterAppRevision};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info};

impl McAppManager {
    /// Whether answers or template version differ from the recorded revision.
    /// Without a revision nothing has been rolled out yet, so nothing changed.
    pub(crate) async fn is_changed(&self, mcapp: &MultiClusterApp) -> Result<bool> {
        let revision_name = mcapp.revision_name();
        if revision_name.is_empty() {
            return Ok(false);
        }
        let revision = self
            .stores
            .revisions
            .get_revision(&self.global_namespace, revision_name)
            .await?;

        Ok(revision.template_version_name != mcapp.spec.template_version_name
            || revision.answers != mcapp.spec.answers)
    }

    async fn create_revision(
        &self,
        mcapp: &MultiClusterApp,
        creator_id: &str,
    ) -> Result<MultiClusterAppRevision> {
        let owner = OwnerReference {
            api_version: MultiClusterApp::api_version(&()).to_string(),
            kind: MultiClusterApp::kind(&()).to_string(),
            name: mcapp.name_any(),
            uid: mcapp.uid().unwrap_or_default(),
            ..Default::default()
        };
        let revision = MultiClusterAppRevision::new(
            ObjectMeta {
                generate_name: Some(REVISION_GENERATE_NAME.to_string()),
                namespace: Some(self.global_namespace.clone()),
                labels: Some(BTreeMap::from([(
                    MULTI_CLUSTER_APP_REVISION.to_string(),
                    mcapp.name_any(),
                )])),
                annotations: Some(BTreeMap::from([(
                    CREATOR_ID.to_string(),
                    creator_id.to_string(),
                )])),
                owner_references: Some(vec![owner]),
                ..Default::default()
            },
            mcapp.spec.template_version_name.clone(),
            mcapp.spec.answers.clone(),
        );
        self.stores.revisions.create_revision(&revision).await
    }

    /// Record the current spec as a new revision and mark the rollout installed.
    ///
    /// Nothing is recorded when the latest stored object already points at a
    /// revision matching the spec.
    pub(crate) async fn set_revision_and_update(
        &self,
        mcapp: &MultiClusterApp,
        creator_id: &str,
    ) -> Result<MultiClusterApp> {
        let latest = self
            .stores
            .mcapps
            .get_multicluster_app(&self.global_namespace, &mcapp.name_any())
            .await?;

        let mut mcapp = mcapp.clone();
        if !latest.revision_name().is_empty() {
            let current = self
                .stores
                .revisions
                .get_revision(&self.global_namespace, latest.revision_name())
                .await?;
            if current.template_version_name == mcapp.spec.template_version_name
                && current.answers == mcapp.spec.answers
            {
                debug!("Revision {} is current", current.name_any());
                return Ok(mcapp);
            }
            mcapp = latest;
        }

        set_installed_done(&mut mcapp);
        let revision = self.create_revision(&mcapp, creator_id).await?;
        info!(
            "Recorded revision {} for {}",
            revision.name_any(),
            mcapp.name_any()
        );
        mcapp.status_mut().revision_name = revision.name_any();
        self.update_condition(&mcapp, set_installed_done).await
    }
}
