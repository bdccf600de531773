// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::kubernetes::store::UserManager;
use crate::types::Member;
use k8s_openapi::api::rbac::v1::Subject;
use tracing::debug;

pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Group every authenticated user belongs to; members named `*` map to it
pub const ALL_AUTHENTICATED_GROUP: &str = "system:authenticated";

pub fn user_subject(name: &str) -> Subject {
    subject("User", name)
}

fn subject(kind: &str, name: &str) -> Subject {
    Subject {
        kind: kind.to_string(),
        name: name.to_string(),
        api_group: Some(RBAC_API_GROUP.to_string()),
        namespace: None,
    }
}

/// Subject for a member. A member known only by principal gets a user provisioned first.
pub async fn build_subject_for_member(member: &Member, users: &dyn UserManager) -> Result<Subject> {
    if !member.user_name.is_empty() && !member.group_principal_name.is_empty() {
        return Err(Error::InvalidMember(format!(
            "member has both username {} and group {} set",
            member.user_name, member.group_principal_name
        )));
    }

    let (kind, name) = if !member.user_name.is_empty() {
        ("User", member.user_name.clone())
    } else if !member.group_principal_name.is_empty() {
        ("Group", member.group_principal_name.clone())
    } else if !member.user_principal_name.is_empty() {
        let name = users
            .ensure_user(&member.user_principal_name, &member.display_name)
            .await?;
        debug!("Resolved principal {} to user {}", member.user_principal_name, name);
        ("User", name)
    } else {
        return Err(Error::InvalidMember(
            "member has no username, principal or group".to_string(),
        ));
    };

    if name == "*" {
        return Ok(subject("Group", ALL_AUTHENTICATED_GROUP));
    }
    Ok(subject(kind, &name))
}
