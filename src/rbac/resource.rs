// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kinds of shared resources that get access tier roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedResourceKind {
    MultiClusterApp,
    ClusterTemplate,
    ClusterTemplateRevision,
    GlobalDns,
    GlobalDnsProvider,
    NodeTemplate,
    CloudCredential,
}

impl SharedResourceKind {
    /// Resource name used in role rules
    pub fn resource(&self) -> &'static str {
        match self {
            Self::MultiClusterApp => "multiclusterapps",
            Self::ClusterTemplate => "clustertemplates",
            Self::ClusterTemplateRevision => "clustertemplaterevisions",
            Self::GlobalDns => "globaldnses",
            Self::GlobalDnsProvider => "globaldnsproviders",
            Self::NodeTemplate => "nodetemplates",
            Self::CloudCredential => "secrets",
        }
    }

    pub fn api_group(&self) -> &'static str {
        match self {
            Self::CloudCredential => "",
            _ => "management.cattle.io",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            Self::CloudCredential => "v1",
            _ => "management.cattle.io/v3",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MultiClusterApp => "MultiClusterApp",
            Self::ClusterTemplate => "ClusterTemplate",
            Self::ClusterTemplateRevision => "ClusterTemplateRevision",
            Self::GlobalDns => "GlobalDns",
            Self::GlobalDnsProvider => "GlobalDnsProvider",
            Self::NodeTemplate => "NodeTemplate",
            Self::CloudCredential => "Secret",
        }
    }

    fn role_suffix(&self) -> &'static str {
        match self {
            Self::MultiClusterApp => "m",
            Self::ClusterTemplate => "ct",
            Self::ClusterTemplateRevision => "ctr",
            Self::GlobalDns => "g",
            Self::GlobalDnsProvider => "gp",
            Self::NodeTemplate => "nt",
            Self::CloudCredential => "cc",
        }
    }

    /// Members without a recognised access type are owners of DNS resources
    /// and read-only everywhere else.
    fn default_access(&self) -> AccessType {
        match self {
            Self::GlobalDns | Self::GlobalDnsProvider => AccessType::Owner,
            _ => AccessType::ReadOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessType {
    Owner,
    Member,
    ReadOnly,
}

impl AccessType {
    pub const ALL: [AccessType; 3] = [AccessType::Owner, AccessType::Member, AccessType::ReadOnly];

    pub fn for_member(access_type: &str, kind: SharedResourceKind) -> Self {
        match access_type {
            "owner" => Self::Owner,
            "member" => Self::Member,
            "read-only" => Self::ReadOnly,
            _ => kind.default_access(),
        }
    }

    pub fn verbs(&self) -> &'static [&'static str] {
        match self {
            Self::Owner => &["*"],
            Self::Member => &["update", "get", "list", "watch"],
            Self::ReadOnly => &["get", "list", "watch"],
        }
    }

    fn tier(&self) -> &'static str {
        match self {
            Self::Owner => "a",
            Self::Member => "u",
            Self::ReadOnly => "r",
        }
    }
}

/// `<name>-<suffix><tier>`, e.g. `wordpress-ma` for the owners of MultiClusterApp wordpress
pub fn role_name(name: &str, kind: SharedResourceKind, access: AccessType) -> String {
    format!("{}-{}{}", name, kind.role_suffix(), access.tier())
}
