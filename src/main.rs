// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mcapp_controller::config::Config;
use mcapp_controller::kubernetes::crd::{APP_CRD, MULTI_CLUSTER_APP_CRD};
use mcapp_controller::kubernetes::{ensure_namespace_exists, wait_for_crd, Collaborators, KubeStore};
use mcapp_controller::reconcilers::{MultiClusterAppReconciler, SharedResourceReconciler};
use mcapp_controller::types::{
    ClusterTemplate, ClusterTemplateRevision, GlobalDns, GlobalDnsProvider, NodeTemplate,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting MultiClusterApp operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: global_namespace={}, conflict_retry_attempts={}",
        config.global_namespace, config.conflict_retry_attempts
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Rancher installs the CRDs; wait for them before starting reconcilers
    info!("Waiting for Rancher CRDs to become available...");
    wait_for_crd(&client, MULTI_CLUSTER_APP_CRD).await?;
    wait_for_crd(&client, APP_CRD).await?;
    ensure_namespace_exists(&client, &config.global_namespace).await?;

    let stores = Collaborators::from_store(Arc::new(KubeStore::new(client.clone())));

    // Aborts pending conflict retries on shutdown
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    let mcapps = MultiClusterAppReconciler::new(client.clone(), config.clone(), stores.clone(), cancel);

    info!("Starting reconcilers...");

    tokio::try_join!(
        mcapps.run(),
        SharedResourceReconciler::<GlobalDns>::new(client.clone(), &config, &stores).run(),
        SharedResourceReconciler::<GlobalDnsProvider>::new(client.clone(), &config, &stores).run(),
        SharedResourceReconciler::<ClusterTemplate>::new(client.clone(), &config, &stores).run(),
        SharedResourceReconciler::<ClusterTemplateRevision>::new(client.clone(), &config, &stores)
            .run(),
        SharedResourceReconciler::<NodeTemplate>::new(client.clone(), &config, &stores).run(),
        SharedResourceReconciler::<Secret>::new(client, &config, &stores).run()
    )?;

    warn!("All reconcilers stopped");
    Ok(())
}
