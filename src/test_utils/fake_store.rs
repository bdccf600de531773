// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory implementation of every collaborator trait.
//!
//! Objects get resource versions on write and stale writes conflict, like the API
//! server. Calls are recorded by operation name and conflicts can be scripted.

use crate::error::{Error, Result};
use crate::kubernetes::store::{
    AppStore, CatalogStore, Collaborators, MultiClusterAppStore, RbacStore, RevisionStore,
    SharedResourceStore, TopologyStore, UserManager,
};
use crate::types::{
    App, CatalogTemplateVersion, ClusterTemplate, Condition, MultiClusterApp,
    MultiClusterAppRevision,
};
use crate::types::app::AppStatus;
use crate::types::management::CatalogTemplateVersionSpec;
use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::core::ErrorResponse;
use kube::{Resource, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

type Key = (String, String);
type Objects<K> = BTreeMap<Key, K>;

pub fn api_error(code: u16, reason: &str, message: String) -> Error {
    Error::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    }))
}

pub fn conflict_error(kind: &str, name: &str) -> Error {
    api_error(
        409,
        "Conflict",
        format!("Operation cannot be fulfilled on {} \"{}\": the object has been modified", kind, name),
    )
}

pub fn not_found_error(kind: &str, name: &str) -> Error {
    api_error(404, "NotFound", format!("{} \"{}\" not found", kind, name))
}

pub fn already_exists_error(kind: &str, name: &str) -> Error {
    api_error(409, "AlreadyExists", format!("{} \"{}\" already exists", kind, name))
}

#[derive(Default)]
struct State {
    mcapps: Objects<MultiClusterApp>,
    revisions: Objects<MultiClusterAppRevision>,
    apps: Objects<App>,
    template_versions: Objects<CatalogTemplateVersion>,
    cluster_templates: Objects<ClusterTemplate>,
    roles: Objects<Role>,
    bindings: Objects<RoleBinding>,
    /// cluster name -> project names
    projects: BTreeMap<String, Vec<String>>,
    /// principal id -> user name
    users: BTreeMap<String, String>,
    calls: Vec<String>,
    conflicts: HashMap<String, usize>,
    failures: HashMap<Key, String>,
    version: u64,
}

impl State {
    fn next_version(&mut self) -> String {
        self.version += 1;
        self.version.to_string()
    }
}

#[derive(Default, Clone)]
pub struct FakeStore {
    state: Arc<Mutex<State>>,
}

fn key_of<K: Resource>(obj: &K) -> Key {
    (
        obj.meta().namespace.clone().unwrap_or_default(),
        obj.meta().name.clone().unwrap_or_default(),
    )
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn create_in<K: Resource + Clone>(
    objects: &mut Objects<K>,
    obj: &K,
    version: String,
    kind: &str,
) -> Result<K> {
    let mut created = obj.clone();
    if created.meta().name.is_none() {
        let prefix = created.meta().generate_name.clone().unwrap_or_default();
        created.meta_mut().name = Some(format!("{}{}", prefix, version));
    }
    let key = key_of(&created);
    if objects.contains_key(&key) {
        return Err(already_exists_error(kind, &key.1));
    }
    created.meta_mut().uid = Some(format!("uid-{}", version));
    created.meta_mut().resource_version = Some(version);
    objects.insert(key, created.clone());
    Ok(created)
}

fn update_in<K: Resource + Clone>(
    objects: &mut Objects<K>,
    obj: &K,
    version: String,
    kind: &str,
) -> Result<K> {
    let key = key_of(obj);
    let stored = objects
        .get(&key)
        .ok_or_else(|| not_found_error(kind, &key.1))?;
    if let Some(rv) = &obj.meta().resource_version {
        if stored.meta().resource_version.as_ref() != Some(rv) {
            return Err(conflict_error(kind, &key.1));
        }
    }
    let mut updated = obj.clone();
    updated.meta_mut().resource_version = Some(version);
    objects.insert(key, updated.clone());
    Ok(updated)
}

fn delete_in<K>(objects: &mut Objects<K>, namespace: &str, name: &str, kind: &str) -> Result<()> {
    objects
        .remove(&key(namespace, name))
        .map(|_| ())
        .ok_or_else(|| not_found_error(kind, name))
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_store(Arc::new(self.clone()))
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Record a call; returns a scripted conflict if one is pending for `op`
    fn enter(&self, op: &str, kind: &str, name: &str) -> Result<()> {
        self.with_state(|s| {
            s.calls.push(op.to_string());
            match s.conflicts.get_mut(op) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    Err(conflict_error(kind, name))
                }
                _ => Ok(()),
            }
        })
    }

    /// Fail the next `times` calls of `op` with a conflict
    pub fn conflict_on(&self, op: &str, times: usize) {
        self.with_state(|s| s.conflicts.insert(op.to_string(), times));
    }

    /// Fail deletes of one object with an internal error
    pub fn fail_delete(&self, namespace: &str, name: &str) {
        self.with_state(|s| s.failures.insert(key(namespace, name), "delete".to_string()));
    }

    pub fn calls(&self, op: &str) -> usize {
        self.with_state(|s| s.calls.iter().filter(|c| *c == op).count())
    }

    pub fn all_calls(&self) -> Vec<String> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    pub fn insert_mcapp(&self, mcapp: MultiClusterApp) -> MultiClusterApp {
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.mcapps, &mcapp, version, "multiclusterapps").unwrap()
        })
    }

    /// Replace the stored object and bump its version, simulating a concurrent writer
    pub fn touch_mcapp(&self, namespace: &str, name: &str, f: impl FnOnce(&mut MultiClusterApp)) {
        self.with_state(|s| {
            let version = s.next_version();
            let mcapp = s.mcapps.get_mut(&key(namespace, name)).unwrap();
            f(mcapp);
            mcapp.metadata.resource_version = Some(version);
        })
    }

    pub fn mcapp(&self, namespace: &str, name: &str) -> MultiClusterApp {
        self.with_state(|s| s.mcapps.get(&key(namespace, name)).cloned().unwrap())
    }

    pub fn insert_revision(&self, revision: MultiClusterAppRevision) -> MultiClusterAppRevision {
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.revisions, &revision, version, "multiclusterapprevisions").unwrap()
        })
    }

    pub fn revisions(&self) -> Vec<MultiClusterAppRevision> {
        self.with_state(|s| s.revisions.values().cloned().collect())
    }

    pub fn insert_app(&self, app: App) -> App {
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.apps, &app, version, "apps").unwrap()
        })
    }

    /// Mark an App installed and deployed
    pub fn set_app_healthy(&self, namespace: &str, name: &str) {
        self.with_state(|s| {
            let version = s.next_version();
            let app = s.apps.get_mut(&key(namespace, name)).unwrap();
            app.status = Some(AppStatus {
                conditions: ["Installed", "Deployed"]
                    .iter()
                    .map(|t| Condition {
                        condition_type: t.to_string(),
                        status: "True".to_string(),
                        ..Default::default()
                    })
                    .collect(),
            });
            app.metadata.resource_version = Some(version);
        })
    }

    pub fn app(&self, namespace: &str, name: &str) -> Option<App> {
        self.with_state(|s| s.apps.get(&key(namespace, name)).cloned())
    }

    pub fn apps(&self) -> Vec<App> {
        self.with_state(|s| s.apps.values().cloned().collect())
    }

    pub fn insert_template_version(&self, namespace: &str, name: &str, external_id: &str) {
        let tv = CatalogTemplateVersion {
            metadata: kube::api::ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: CatalogTemplateVersionSpec {
                external_id: external_id.to_string(),
                version: String::new(),
            },
        };
        self.with_state(|s| s.template_versions.insert(key(namespace, name), tv));
    }

    pub fn insert_cluster_template(&self, template: ClusterTemplate) {
        self.with_state(|s| s.cluster_templates.insert(key_of(&template), template));
    }

    pub fn insert_project(&self, cluster_name: &str, project_name: &str) {
        self.with_state(|s| {
            s.projects
                .entry(cluster_name.to_string())
                .or_default()
                .push(project_name.to_string())
        });
    }

    pub fn insert_user(&self, principal_id: &str, name: &str) {
        self.with_state(|s| s.users.insert(principal_id.to_string(), name.to_string()));
    }

    pub fn insert_role(&self, role: Role) {
        self.with_state(|s| s.roles.insert(key_of(&role), role));
    }

    pub fn insert_role_binding(&self, binding: RoleBinding) {
        self.with_state(|s| s.bindings.insert(key_of(&binding), binding));
    }

    pub fn role(&self, namespace: &str, name: &str) -> Option<Role> {
        self.with_state(|s| s.roles.get(&key(namespace, name)).cloned())
    }

    pub fn role_binding(&self, namespace: &str, name: &str) -> Option<RoleBinding> {
        self.with_state(|s| s.bindings.get(&key(namespace, name)).cloned())
    }

    pub fn role_names(&self) -> Vec<String> {
        self.with_state(|s| s.roles.keys().map(|(_, n)| n.clone()).collect())
    }
}

#[async_trait]
impl MultiClusterAppStore for FakeStore {
    async fn get_multicluster_app(&self, namespace: &str, name: &str) -> Result<MultiClusterApp> {
        self.enter("get_multicluster_app", "multiclusterapps", name)?;
        self.with_state(|s| s.mcapps.get(&key(namespace, name)).cloned())
            .ok_or_else(|| not_found_error("multiclusterapps", name))
    }

    async fn update_multicluster_app(&self, mcapp: &MultiClusterApp) -> Result<MultiClusterApp> {
        self.enter("update_multicluster_app", "multiclusterapps", &mcapp.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            update_in(&mut s.mcapps, mcapp, version, "multiclusterapps")
        })
    }
}

#[async_trait]
impl RevisionStore for FakeStore {
    async fn get_revision(&self, namespace: &str, name: &str) -> Result<MultiClusterAppRevision> {
        self.enter("get_revision", "multiclusterapprevisions", name)?;
        self.with_state(|s| s.revisions.get(&key(namespace, name)).cloned())
            .ok_or_else(|| not_found_error("multiclusterapprevisions", name))
    }

    async fn create_revision(
        &self,
        revision: &MultiClusterAppRevision,
    ) -> Result<MultiClusterAppRevision> {
        self.enter("create_revision", "multiclusterapprevisions", "")?;
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.revisions, revision, version, "multiclusterapprevisions")
        })
    }
}

#[async_trait]
impl AppStore for FakeStore {
    async fn get_app(&self, namespace: &str, name: &str) -> Result<Option<App>> {
        self.enter("get_app", "apps", name)?;
        Ok(self.app(namespace, name))
    }

    async fn list_apps(&self, namespace: &str, label_selector: &str) -> Result<Vec<App>> {
        self.enter("list_apps", "apps", "")?;
        let (label, value) = label_selector.split_once('=').unwrap_or((label_selector, ""));
        Ok(self.with_state(|s| {
            s.apps
                .values()
                .filter(|a| a.metadata.namespace.as_deref() == Some(namespace))
                .filter(|a| a.labels().get(label).is_some_and(|v| value.is_empty() || v == value))
                .cloned()
                .collect()
        }))
    }

    async fn create_app(&self, app: &App) -> Result<App> {
        self.enter("create_app", "apps", &app.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.apps, app, version, "apps")
        })
    }

    async fn update_app(&self, app: &App) -> Result<App> {
        self.enter("update_app", "apps", &app.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            update_in(&mut s.apps, app, version, "apps")
        })
    }

    async fn delete_app(&self, namespace: &str, name: &str) -> Result<()> {
        self.enter("delete_app", "apps", name)?;
        self.with_state(|s| {
            if s.failures.contains_key(&key(namespace, name)) {
                return Err(api_error(500, "InternalError", format!("cannot delete {}", name)));
            }
            delete_in(&mut s.apps, namespace, name, "apps")
        })
    }
}

#[async_trait]
impl CatalogStore for FakeStore {
    async fn get_template_version(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CatalogTemplateVersion>> {
        self.enter("get_template_version", "catalogtemplateversions", name)?;
        Ok(self.with_state(|s| s.template_versions.get(&key(namespace, name)).cloned()))
    }
}

#[async_trait]
impl TopologyStore for FakeStore {
    async fn list_cluster_names(&self) -> Result<Vec<String>> {
        self.enter("list_cluster_names", "clusters", "")?;
        Ok(self.with_state(|s| s.projects.keys().cloned().collect()))
    }

    async fn list_project_names(&self, cluster_name: &str) -> Result<Vec<String>> {
        self.enter("list_project_names", "projects", "")?;
        Ok(self.with_state(|s| s.projects.get(cluster_name).cloned().unwrap_or_default()))
    }
}

#[async_trait]
impl RbacStore for FakeStore {
    async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>> {
        self.enter("get_role", "roles", name)?;
        Ok(self.role(namespace, name))
    }

    async fn create_role(&self, role: &Role) -> Result<Role> {
        self.enter("create_role", "roles", &role.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.roles, role, version, "roles")
        })
    }

    async fn update_role(&self, role: &Role) -> Result<Role> {
        self.enter("update_role", "roles", &role.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            update_in(&mut s.roles, role, version, "roles")
        })
    }

    async fn delete_role(&self, namespace: &str, name: &str) -> Result<()> {
        self.enter("delete_role", "roles", name)?;
        self.with_state(|s| delete_in(&mut s.roles, namespace, name, "roles"))
    }

    async fn get_role_binding(&self, namespace: &str, name: &str) -> Result<Option<RoleBinding>> {
        self.enter("get_role_binding", "rolebindings", name)?;
        Ok(self.role_binding(namespace, name))
    }

    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding> {
        self.enter("create_role_binding", "rolebindings", &binding.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            create_in(&mut s.bindings, binding, version, "rolebindings")
        })
    }

    async fn update_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding> {
        self.enter("update_role_binding", "rolebindings", &binding.name_any())?;
        self.with_state(|s| {
            let version = s.next_version();
            update_in(&mut s.bindings, binding, version, "rolebindings")
        })
    }

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<()> {
        self.enter("delete_role_binding", "rolebindings", name)?;
        self.with_state(|s| delete_in(&mut s.bindings, namespace, name, "rolebindings"))
    }
}

#[async_trait]
impl UserManager for FakeStore {
    async fn ensure_user(&self, principal_id: &str, _display_name: &str) -> Result<String> {
        self.enter("ensure_user", "users", principal_id)?;
        Ok(self.with_state(|s| {
            if let Some(name) = s.users.get(principal_id) {
                return name.clone();
            }
            let name = format!("u-{}", s.next_version());
            s.users.insert(principal_id.to_string(), name.clone());
            name
        }))
    }
}

#[async_trait]
impl SharedResourceStore for FakeStore {
    async fn get_cluster_template(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ClusterTemplate>> {
        self.enter("get_cluster_template", "clustertemplates", name)?;
        Ok(self.with_state(|s| s.cluster_templates.get(&key(namespace, name)).cloned()))
    }
}
