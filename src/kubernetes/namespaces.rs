// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::{Error, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument};

/// Ensure the global namespace holding MultiClusterApps and their revisions exists
#[instrument(skip(client))]
pub async fn ensure_namespace_exists(client: &Client, namespace: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let existing = namespaces.get_opt(namespace).await.map_err(|e| {
        Error::NamespaceError(format!("Failed to check namespace {}: {}", namespace, e))
    })?;
    if existing.is_some() {
        debug!("Namespace {} already exists", namespace);
        return Ok(());
    }

    info!("Creating namespace {}", namespace);
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            info!("Namespace {} created successfully", namespace);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            debug!("Namespace {} was created concurrently", namespace);
            Ok(())
        }
        Err(e) => Err(Error::NamespaceError(format!(
            "Failed to create namespace {}: {}",
            namespace, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_service::{namespace_json, MockService};

    #[tokio::test]
    async fn test_existing_namespace_is_not_created() {
        let service = MockService::new().on_get(
            "/api/v1/namespaces/cattle-global-data",
            200,
            &namespace_json("cattle-global-data"),
        );
        let client = service.clone().into_client();

        ensure_namespace_exists(&client, "cattle-global-data")
            .await
            .unwrap();

        let posts = service
            .requests()
            .into_iter()
            .filter(|(method, _)| method == "POST")
            .count();
        assert_eq!(posts, 0);
    }

    #[tokio::test]
    async fn test_missing_namespace_is_created() {
        let service = MockService::new().on_post(
            "/api/v1/namespaces",
            201,
            &namespace_json("cattle-global-data"),
        );
        let client = service.clone().into_client();

        ensure_namespace_exists(&client, "cattle-global-data")
            .await
            .unwrap();

        assert!(service
            .requests()
            .contains(&("POST".to_string(), "/api/v1/namespaces".to_string())));
    }

    #[tokio::test]
    async fn test_create_failure_is_namespace_error() {
        let client = MockService::new()
            .on_post("/api/v1/namespaces", 403, "{}")
            .into_client();

        let err = ensure_namespace_exists(&client, "cattle-global-data")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NamespaceError(_)));
    }
}
