// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::runtime::finalizer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Finalizer error: {0}")]
    FinalizerError(#[source] Box<finalizer::Error<Error>>),

    #[error("error in splitting project name: {0}")]
    InvalidProjectName(String),

    #[error("invalid templateVersion provided: {0}")]
    InvalidTemplateVersion(String),

    #[error("templateVersion {0} not found")]
    TemplateVersionNotFound(String),

    #[error("error in splitting clusterTemplateName: {0}")]
    InvalidClusterTemplateName(String),

    #[error("cluster template {0} not found")]
    ClusterTemplateNotFound(String),

    #[error("{kind} {name} has no creatorId annotation")]
    MissingCreatorId { kind: String, name: String },

    #[error("app {name} in {namespace} not found")]
    AppNotFound { namespace: String, name: String },

    #[error("app {name} in {namespace} missing multi cluster app label")]
    MissingAppLabel { namespace: String, name: String },

    #[error("Invalid member: {0}")]
    InvalidMember(String),

    #[error("Invalid timestamp {value}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Namespace creation failed: {0}")]
    NamespaceError(String),

    #[error("operation {0} cancelled")]
    Cancelled(String),
}

impl Error {
    /// Optimistic concurrency failure (HTTP 409 Conflict).
    pub fn is_conflict(&self) -> bool {
        self.api_status().is_some_and(|(code, reason)| code == 409 && reason != "AlreadyExists")
    }

    pub fn is_not_found(&self) -> bool {
        self.api_status().is_some_and(|(code, _)| code == 404 || code == 410)
    }

    pub fn is_already_exists(&self) -> bool {
        self.api_status().is_some_and(|(code, reason)| code == 409 && reason == "AlreadyExists")
    }

    fn api_status(&self) -> Option<(u16, &str)> {
        match self {
            Error::KubeError(kube::Error::Api(resp)) => Some((resp.code, resp.reason.as_str())),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
