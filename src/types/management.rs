// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Management resources the controllers only read from (or, for users, ensure).

use k8s_openapi::{ClusterResourceScope, Resource};
use kube::api::{ObjectMeta, TypeMeta};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "CatalogTemplateVersion")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTemplateVersionSpec {
    #[serde(default)]
    pub external_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// Rancher's management view of a downstream cluster
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "Cluster")]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
}

/// Lives in the namespace named after its cluster; its own name is the project namespace
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "Project")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
}

/// Rancher user; fields live at the top level
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeMeta>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principal_ids: Vec<String>,
}

impl User {
    pub fn new(metadata: ObjectMeta, display_name: &str, principal_id: &str) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: <Self as Resource>::API_VERSION.to_string(),
                kind: <Self as Resource>::KIND.to_string(),
            }),
            metadata,
            display_name: display_name.to_string(),
            username: String::new(),
            principal_ids: vec![principal_id.to_string()],
        }
    }

    pub fn has_principal(&self, principal_id: &str) -> bool {
        self.principal_ids.iter().any(|p| p == principal_id)
    }
}

impl Resource for User {
    const API_VERSION: &'static str = "management.cattle.io/v3";
    const GROUP: &'static str = "management.cattle.io";
    const KIND: &'static str = "User";
    const VERSION: &'static str = "v3";
    const URL_PATH_SEGMENT: &'static str = "users";
    type Scope = ClusterResourceScope;
}

impl k8s_openapi::Metadata for User {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
