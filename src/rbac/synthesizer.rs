// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applies the access tiers of a shared resource as Role/RoleBinding pairs.
//!
//! The owner tier always exists and always contains the creator. Member and
//! read-only tiers exist only while they have subjects. Objects are compared
//! before writing, so a repeated call with unchanged members only reads.

use crate::error::Result;
use crate::kubernetes::store::{RbacStore, UserManager};
use crate::rbac::resource::{role_name, AccessType, SharedResourceKind};
use crate::rbac::subjects::{build_subject_for_member, user_subject, RBAC_API_GROUP};
use crate::types::Member;
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The shared resource whose tiers are synthesized
#[derive(Debug, Clone)]
pub struct RbacTarget<'a> {
    pub kind: SharedResourceKind,
    pub name: &'a str,
    pub namespace: &'a str,
    pub uid: &'a str,
    pub creator_id: &'a str,
    pub members: &'a [Member],
}

impl RbacTarget<'_> {
    fn owner_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: self.kind.api_version().to_string(),
            kind: self.kind.kind().to_string(),
            name: self.name.to_string(),
            uid: self.uid.to_string(),
            ..Default::default()
        }
    }

    fn metadata(&self, name: String) -> ObjectMeta {
        ObjectMeta {
            name: Some(name),
            namespace: Some(self.namespace.to_string()),
            owner_references: Some(vec![self.owner_reference()]),
            ..Default::default()
        }
    }

    fn role(&self, access: AccessType) -> Role {
        Role {
            metadata: self.metadata(role_name(self.name, self.kind, access)),
            rules: Some(vec![PolicyRule {
                api_groups: Some(vec![self.kind.api_group().to_string()]),
                resources: Some(vec![self.kind.resource().to_string()]),
                resource_names: Some(vec![self.name.to_string()]),
                verbs: access.verbs().iter().map(|v| v.to_string()).collect(),
                ..Default::default()
            }]),
        }
    }

    fn role_binding(&self, access: AccessType, subjects: Vec<Subject>) -> RoleBinding {
        let name = role_name(self.name, self.kind, access);
        RoleBinding {
            metadata: self.metadata(name.clone()),
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "Role".to_string(),
                name,
            },
            subjects: Some(subjects),
        }
    }
}

#[derive(Clone)]
pub struct RoleSynthesizer {
    rbac: Arc<dyn RbacStore>,
    users: Arc<dyn UserManager>,
}

impl RoleSynthesizer {
    pub fn new(rbac: Arc<dyn RbacStore>, users: Arc<dyn UserManager>) -> Self {
        Self { rbac, users }
    }

    #[instrument(skip(self, target), fields(kind = ?target.kind, name = %target.name))]
    pub async fn create_role_and_role_binding(&self, target: &RbacTarget<'_>) -> Result<()> {
        self.ensure_role(target.role(AccessType::Owner)).await?;

        let mut tiers: BTreeMap<AccessType, Vec<Subject>> = BTreeMap::new();
        tiers
            .entry(AccessType::Owner)
            .or_default()
            .push(user_subject(target.creator_id));
        for member in target.members {
            let access = AccessType::for_member(&member.access_type, target.kind);
            let subject = build_subject_for_member(member, self.users.as_ref()).await?;
            tiers.entry(access).or_default().push(subject);
        }

        for access in AccessType::ALL {
            let mut subjects = tiers.remove(&access).unwrap_or_default();
            subjects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.kind.cmp(&b.kind)));
            subjects.dedup();

            if access != AccessType::Owner && subjects.is_empty() {
                self.delete_tier(target, access).await?;
                continue;
            }
            if access != AccessType::Owner {
                self.ensure_role(target.role(access)).await?;
            }
            self.ensure_role_binding(target.role_binding(access, subjects))
                .await?;
        }
        Ok(())
    }

    async fn ensure_role(&self, desired: Role) -> Result<()> {
        let namespace = desired.metadata.namespace.clone().unwrap_or_default();
        let name = desired.metadata.name.clone().unwrap_or_default();

        match self.rbac.get_role(&namespace, &name).await? {
            None => {
                info!("Creating role {}/{}", namespace, name);
                match self.rbac.create_role(&desired).await {
                    Err(e) if !e.is_already_exists() => return Err(e),
                    _ => {}
                }
            }
            Some(existing) if existing.rules == desired.rules => {
                debug!("Role {}/{} is up to date", namespace, name);
            }
            Some(mut existing) => {
                info!("Updating rules of role {}/{}", namespace, name);
                existing.rules = desired.rules;
                self.rbac.update_role(&existing).await?;
            }
        }
        Ok(())
    }

    async fn ensure_role_binding(&self, desired: RoleBinding) -> Result<()> {
        let namespace = desired.metadata.namespace.clone().unwrap_or_default();
        let name = desired.metadata.name.clone().unwrap_or_default();

        match self.rbac.get_role_binding(&namespace, &name).await? {
            None => {
                info!("Creating role binding {}/{}", namespace, name);
                match self.rbac.create_role_binding(&desired).await {
                    Err(e) if !e.is_already_exists() => return Err(e),
                    _ => {}
                }
            }
            Some(existing) if existing.subjects == desired.subjects => {
                debug!("Role binding {}/{} is up to date", namespace, name);
            }
            Some(mut existing) => {
                info!("Updating subjects of role binding {}/{}", namespace, name);
                existing.subjects = desired.subjects;
                self.rbac.update_role_binding(&existing).await?;
            }
        }
        Ok(())
    }

    /// Remove the Role and RoleBinding of a tier without subjects
    async fn delete_tier(&self, target: &RbacTarget<'_>, access: AccessType) -> Result<()> {
        let name = role_name(target.name, target.kind, access);

        if self.rbac.get_role(target.namespace, &name).await?.is_some() {
            info!("Deleting role {}/{}", target.namespace, name);
            match self.rbac.delete_role(target.namespace, &name).await {
                Err(e) if !e.is_not_found() => return Err(e),
                _ => {}
            }
        }
        if self
            .rbac
            .get_role_binding(target.namespace, &name)
            .await?
            .is_some()
        {
            info!("Deleting role binding {}/{}", target.namespace, name);
            match self.rbac.delete_role_binding(target.namespace, &name).await {
                Err(e) if !e.is_not_found() => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }
}
