// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Global resources shared with other users through member access tiers.

use crate::types::multicluster_app::Member;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "GlobalDns", plural = "globaldnses")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDnsSpec {
    #[serde(default)]
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub multi_cluster_app_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "GlobalDnsProvider")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDnsProviderSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_domain: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "ClusterTemplate")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTemplateSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_revision_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "ClusterTemplateRevision")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTemplateRevisionSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// `<namespace>:<name>` of the parent ClusterTemplate
    #[serde(default)]
    pub cluster_template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "management.cattle.io", version = "v3", kind = "NodeTemplate")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplateSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub driver: String,
}
