// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::condition::{Condition, HasConditions};
use k8s_openapi::{NamespaceResourceScope, Resource};
use kube::api::{ObjectMeta, TypeMeta};
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "MultiClusterApp")]
#[kube(namespaced)]
#[kube(status = "MultiClusterAppStatus")]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterAppSpec {
    /// `<namespace>:<name>` of a CatalogTemplateVersion
    pub template_version_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub wait: bool,
    #[serde(default)]
    pub timeout: i64,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub upgrade_strategy: UpgradeStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i64>,
}

/// Helm values scoped to every target, one cluster, or one project
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values_set_string: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// `<cluster>:<projectNamespace>`
    pub project_name: String,
    /// Set once the child App exists
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub healthstate: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_principal_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_principal_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_type: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdate>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RollingUpdate {
    #[serde(default)]
    pub batch_size: i64,
    /// Seconds between batches
    #[serde(default)]
    pub interval: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterAppStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision_name: String,
}

impl MultiClusterApp {
    pub fn revision_name(&self) -> &str {
        self.status
            .as_ref()
            .map(|s| s.revision_name.as_str())
            .unwrap_or_default()
    }

    pub fn status_mut(&mut self) -> &mut MultiClusterAppStatus {
        self.status.get_or_insert_with(Default::default)
    }

    pub fn rolling_update(&self) -> Option<&RollingUpdate> {
        self.spec.upgrade_strategy.rolling_update.as_ref()
    }
}

impl HasConditions for MultiClusterApp {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status_mut().conditions
    }
}

/// Immutable snapshot of the answers and template version of a completed rollout.
///
/// Unlike most Rancher types the payload lives at the top level, not under `spec`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterAppRevision {
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeMeta>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_version_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<Answer>,
}

impl MultiClusterAppRevision {
    pub fn new(metadata: ObjectMeta, template_version_name: String, answers: Vec<Answer>) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: <Self as Resource>::API_VERSION.to_string(),
                kind: <Self as Resource>::KIND.to_string(),
            }),
            metadata,
            template_version_name,
            answers,
        }
    }
}

impl Resource for MultiClusterAppRevision {
    const API_VERSION: &'static str = "management.cattle.io/v3";
    const GROUP: &'static str = "management.cattle.io";
    const KIND: &'static str = "MultiClusterAppRevision";
    const VERSION: &'static str = "v3";
    const URL_PATH_SEGMENT: &'static str = "multiclusterapprevisions";
    type Scope = NamespaceResourceScope;
}

impl k8s_openapi::Metadata for MultiClusterAppRevision {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
