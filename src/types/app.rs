// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::condition::{Condition, HasConditions, DEPLOYED, INSTALLED};
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Helm release of one chart in one project
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "project.cattle.io", version = "v3", kind = "App")]
#[kube(namespaced)]
#[kube(status = "AppStatus")]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    #[serde(default)]
    pub project_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub target_namespace: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub multi_cluster_app_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers_set_string: BTreeMap<String, String>,
    #[serde(default)]
    pub wait: bool,
    #[serde(default)]
    pub timeout: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl App {
    /// Installed and deployed by the helm controller
    pub fn is_healthy(&self) -> bool {
        INSTALLED.is_true(self) && DEPLOYED.is_true(self)
    }
}

impl HasConditions for App {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.get_or_insert_with(Default::default).conditions
    }
}
