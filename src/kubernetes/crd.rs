// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// A group/version/kind that must be served before controllers start
#[derive(Debug, Clone, Copy)]
pub struct RequiredCrd {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
}

pub const MULTI_CLUSTER_APP_CRD: RequiredCrd = RequiredCrd {
    group: "management.cattle.io",
    version: "v3",
    kind: "MultiClusterApp",
};

pub const APP_CRD: RequiredCrd = RequiredCrd {
    group: "project.cattle.io",
    version: "v3",
    kind: "App",
};

/// Wait for a CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_crd(client: &Client, crd: RequiredCrd) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_crd_exists(client, crd).await {
            Ok(true) => {
                info!("{} CRD ({}/{}) is available", crd.kind, crd.group, crd.version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "{} CRD ({}/{}) not yet available, waiting {} seconds...",
                    crd.kind, crd.group, crd.version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {} CRD: {}, retrying in {} seconds...",
                    crd.kind, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        interval = next_interval(interval);
    }
}

fn next_interval(interval: u64) -> u64 {
    (interval * 2).min(POLL_MAX_INTERVAL_SECS)
}

async fn check_crd_exists(client: &Client, crd: RequiredCrd) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[crd.group])
        .run()
        .await?;

    let found = discovery
        .groups()
        .filter(|group| group.name() == crd.group)
        .flat_map(|group| group.recommended_resources())
        .any(|(ar, _)| ar.kind == crd.kind && ar.version == crd.version);
    Ok(found)
}
