// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Collaborator implementations backed by the Kubernetes API

use crate::constants::OPERATOR_NAME;
use crate::error::Result;
use crate::kubernetes::store::{
    AppStore, CatalogStore, MultiClusterAppStore, RbacStore, RevisionStore, SharedResourceStore,
    TopologyStore, UserManager,
};
use crate::types::{
    App, CatalogTemplateVersion, Cluster, ClusterTemplate, MultiClusterApp,
    MultiClusterAppRevision, Project, User,
};
use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::{
    api::{DeleteParams, ListParams, ObjectMeta, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        }
    }
}

fn namespace_of<K: kube::Resource>(obj: &K) -> String {
    obj.meta().namespace.clone().unwrap_or_default()
}

#[async_trait]
impl MultiClusterAppStore for KubeStore {
    async fn get_multicluster_app(&self, namespace: &str, name: &str) -> Result<MultiClusterApp> {
        Ok(self.namespaced::<MultiClusterApp>(namespace).get(name).await?)
    }

    async fn update_multicluster_app(&self, mcapp: &MultiClusterApp) -> Result<MultiClusterApp> {
        let api = self.namespaced::<MultiClusterApp>(&namespace_of(mcapp));
        Ok(api
            .replace(&mcapp.name_any(), &Self::post_params(), mcapp)
            .await?)
    }
}

#[async_trait]
impl RevisionStore for KubeStore {
    async fn get_revision(&self, namespace: &str, name: &str) -> Result<MultiClusterAppRevision> {
        Ok(self
            .namespaced::<MultiClusterAppRevision>(namespace)
            .get(name)
            .await?)
    }

    async fn create_revision(
        &self,
        revision: &MultiClusterAppRevision,
    ) -> Result<MultiClusterAppRevision> {
        let api = self.namespaced::<MultiClusterAppRevision>(&namespace_of(revision));
        Ok(api.create(&Self::post_params(), revision).await?)
    }
}

#[async_trait]
impl AppStore for KubeStore {
    async fn get_app(&self, namespace: &str, name: &str) -> Result<Option<App>> {
        Ok(self.namespaced::<App>(namespace).get_opt(name).await?)
    }

    async fn list_apps(&self, namespace: &str, label_selector: &str) -> Result<Vec<App>> {
        let lp = ListParams::default().labels(label_selector);
        Ok(self.namespaced::<App>(namespace).list(&lp).await?.items)
    }

    async fn create_app(&self, app: &App) -> Result<App> {
        let api = self.namespaced::<App>(&namespace_of(app));
        Ok(api.create(&Self::post_params(), app).await?)
    }

    async fn update_app(&self, app: &App) -> Result<App> {
        let api = self.namespaced::<App>(&namespace_of(app));
        Ok(api.replace(&app.name_any(), &Self::post_params(), app).await?)
    }

    async fn delete_app(&self, namespace: &str, name: &str) -> Result<()> {
        self.namespaced::<App>(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for KubeStore {
    async fn get_template_version(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CatalogTemplateVersion>> {
        Ok(self
            .namespaced::<CatalogTemplateVersion>(namespace)
            .get_opt(name)
            .await?)
    }
}

#[async_trait]
impl TopologyStore for KubeStore {
    async fn list_cluster_names(&self) -> Result<Vec<String>> {
        let clusters: Api<Cluster> = Api::all(self.client.clone());
        let list = clusters.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|c| c.name_any()).collect())
    }

    async fn list_project_names(&self, cluster_name: &str) -> Result<Vec<String>> {
        let list = self
            .namespaced::<Project>(cluster_name)
            .list(&ListParams::default())
            .await?;
        Ok(list.items.iter().map(|p| p.name_any()).collect())
    }
}

#[async_trait]
impl RbacStore for KubeStore {
    async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>> {
        Ok(self.namespaced::<Role>(namespace).get_opt(name).await?)
    }

    async fn create_role(&self, role: &Role) -> Result<Role> {
        let api = self.namespaced::<Role>(&namespace_of(role));
        Ok(api.create(&Self::post_params(), role).await?)
    }

    async fn update_role(&self, role: &Role) -> Result<Role> {
        let api = self.namespaced::<Role>(&namespace_of(role));
        Ok(api.replace(&role.name_any(), &Self::post_params(), role).await?)
    }

    async fn delete_role(&self, namespace: &str, name: &str) -> Result<()> {
        self.namespaced::<Role>(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn get_role_binding(&self, namespace: &str, name: &str) -> Result<Option<RoleBinding>> {
        Ok(self.namespaced::<RoleBinding>(namespace).get_opt(name).await?)
    }

    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding> {
        let api = self.namespaced::<RoleBinding>(&namespace_of(binding));
        Ok(api.create(&Self::post_params(), binding).await?)
    }

    async fn update_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding> {
        let api = self.namespaced::<RoleBinding>(&namespace_of(binding));
        Ok(api
            .replace(&binding.name_any(), &Self::post_params(), binding)
            .await?)
    }

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<()> {
        self.namespaced::<RoleBinding>(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserManager for KubeStore {
    #[instrument(skip(self))]
    async fn ensure_user(&self, principal_id: &str, display_name: &str) -> Result<String> {
        let users: Api<User> = Api::all(self.client.clone());

        let existing = users.list(&ListParams::default()).await?;
        if let Some(user) = existing.items.iter().find(|u| u.has_principal(principal_id)) {
            debug!("User {} already owns principal {}", user.name_any(), principal_id);
            return Ok(user.name_any());
        }

        info!("Creating user for principal {}", principal_id);
        let user = User::new(
            ObjectMeta {
                generate_name: Some("u-".to_string()),
                ..Default::default()
            },
            display_name,
            principal_id,
        );
        let created = users.create(&Self::post_params(), &user).await?;
        Ok(created.name_any())
    }
}

#[async_trait]
impl SharedResourceStore for KubeStore {
    async fn get_cluster_template(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ClusterTemplate>> {
        Ok(self
            .namespaced::<ClusterTemplate>(namespace)
            .get_opt(name)
            .await?)
    }
}
