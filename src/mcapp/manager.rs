// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of one MultiClusterApp into its per-project Apps.

use crate::answers::create_answers_map;
use crate::config::Config;
use crate::constants::{annotations::CREATOR_ID, UPGRADING_MESSAGE};
use crate::error::{Error, Result};
use crate::kubernetes::Collaborators;
use crate::mcapp::interval::IntervalTracker;
use crate::mcapp::rollout::{batch_size, remaining_interval, to_update};
use crate::retry::{retry_on_conflict, RetryConfig};
use crate::types::{MultiClusterApp, INSTALLED};
use chrono::{SecondsFormat, Utc};
use kube::ResourceExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Shortest requeue while a rolling update waits on its interval
const MIN_ROLLOUT_REQUEUE: Duration = Duration::from_secs(1);
const MAX_ROLLOUT_REQUEUE: Duration = Duration::from_secs(60 * 60);

fn rollout_requeue(left: Duration) -> Duration {
    left.clamp(MIN_ROLLOUT_REQUEUE, MAX_ROLLOUT_REQUEUE)
}

/// Result of one sync pass
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Latest known state of the MultiClusterApp; `None` once it is deleted
    pub object: Option<MultiClusterApp>,
    /// Set while a rolling update waits for its interval to pass
    pub requeue_after: Option<Duration>,
}

impl SyncOutcome {
    fn done(object: MultiClusterApp) -> Self {
        Self {
            object: Some(object),
            requeue_after: None,
        }
    }
}

pub struct McAppManager {
    pub(crate) stores: Collaborators,
    pub(crate) global_namespace: String,
    pub(crate) retry: RetryConfig,
    pub(crate) cancel: CancellationToken,
    intervals: IntervalTracker,
}

impl McAppManager {
    pub fn new(stores: Collaborators, config: &Config, cancel: CancellationToken) -> Self {
        Self {
            stores,
            global_namespace: config.global_namespace.clone(),
            retry: config.conflict_retry(),
            cancel,
            intervals: IntervalTracker::new(),
        }
    }

    pub fn intervals(&self) -> &IntervalTracker {
        &self.intervals
    }

    /// Bring the Apps of a MultiClusterApp in line with its spec.
    ///
    /// `mcapp` is `None` when the object no longer exists; together with a set
    /// deletion timestamp that removes every child App.
    #[instrument(skip(self, mcapp))]
    pub async fn sync(&self, name: &str, mcapp: Option<&MultiClusterApp>) -> Result<SyncOutcome> {
        let mcapp = match mcapp {
            Some(mcapp) if mcapp.metadata.deletion_timestamp.is_none() => mcapp,
            _ => {
                info!("MultiClusterApp {} is being deleted, removing its apps", name);
                self.intervals.delete(name);
                self.delete_apps(name).await?;
                return Ok(SyncOutcome::default());
            }
        };

        let creator_id = mcapp
            .annotations()
            .get(CREATOR_ID)
            .cloned()
            .ok_or_else(|| Error::MissingCreatorId {
                kind: "MultiClusterApp".to_string(),
                name: name.to_string(),
            })?;
        let system_user = self
            .stores
            .users
            .ensure_user(
                &format!("system://{}", name),
                &format!("System account for Multiclusterapp {}", name),
            )
            .await?;

        let answers = create_answers_map(&mcapp.spec.answers)?;
        let external_id = self.get_external_id(mcapp).await?;

        self.reconcile_targets_for_delete(mcapp).await?;

        let changed = self.is_changed(mcapp).await?;
        let to_update = changed && to_update(mcapp, Utc::now())?;
        let batch_size = batch_size(mcapp, to_update);
        debug!(changed, to_update, batch_size, "Rolling out apps");

        let resp = self
            .create_apps(mcapp, &external_id, &answers, &system_user, batch_size, to_update)
            .await?;
        let mut mcapp = resp.object;

        if !changed {
            if mcapp.revision_name().is_empty() {
                let updated = self.set_revision_and_update(&mcapp, &creator_id).await?;
                return Ok(SyncOutcome::done(updated));
            }
            return Ok(SyncOutcome::done(mcapp));
        }

        if resp.count == mcapp.spec.targets.len()
            && INSTALLED.is_unknown(&mcapp)
            && INSTALLED.message(&mcapp) == UPGRADING_MESSAGE
        {
            info!("All {} apps of {} are up to date", resp.count, name);
            self.intervals.delete(name);
            let updated = self.set_revision_and_update(&mcapp, &creator_id).await?;
            return Ok(SyncOutcome::done(updated));
        }

        if !to_update || resp.remaining == 0 {
            let requeue_after = self
                .intervals
                .remaining(name)
                .or_else(|| remaining_interval(&mcapp, Utc::now()))
                .map(rollout_requeue);
            return Ok(SyncOutcome {
                object: Some(mcapp),
                requeue_after,
            });
        }

        let mut remaining = resp.remaining;
        for (app, project_name) in resp.update_apps.iter().zip(&resp.projects) {
            self.update_app(app, &answers, &external_id, project_name)
                .await?;
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }

        set_installed_unknown(&mut mcapp);
        let updated = self.update_condition(&mcapp, set_installed_unknown).await?;

        let interval = mcapp.rolling_update().map(|r| r.interval).unwrap_or(0);
        if interval > 0 {
            self.intervals
                .store(name, Duration::from_secs(interval.unsigned_abs()));
        }
        Ok(SyncOutcome {
            object: Some(updated),
            requeue_after: self
                .intervals
                .remaining(name)
                .map(rollout_requeue),
        })
    }

    /// Write a MultiClusterApp, retrying conflicts on the latest version with only
    /// the fields this pass owns re-applied: assigned app names, the revision name
    /// and the condition set by `set_condition`.
    pub(crate) async fn update_condition(
        &self,
        desired: &MultiClusterApp,
        set_condition: fn(&mut MultiClusterApp),
    ) -> Result<MultiClusterApp> {
        match self.stores.mcapps.update_multicluster_app(desired).await {
            Err(e) if e.is_conflict() => {
                debug!("Conflict updating {}, retrying on latest", desired.name_any());
            }
            other => return other,
        }

        let mcapps = &self.stores.mcapps;
        let namespace = self.global_namespace.as_str();
        let name = desired.name_any();
        let name = name.as_str();

        retry_on_conflict(&self.retry, &self.cancel, "update_condition", move || async move {
            let mut latest = mcapps.get_multicluster_app(namespace, name).await?;
            for (index, target) in desired.spec.targets.iter().enumerate() {
                if target.app_name.is_empty() {
                    continue;
                }
                if let Some(t) = latest.spec.targets.get_mut(index) {
                    t.app_name = target.app_name.clone();
                }
            }
            latest.status_mut().revision_name = desired.revision_name().to_string();
            set_condition(&mut latest);
            mcapps.update_multicluster_app(&latest).await
        })
        .await
    }
}

/// Mark a rolling update batch as started now
pub fn set_installed_unknown(mcapp: &mut MultiClusterApp) {
    INSTALLED.set_unknown(mcapp);
    INSTALLED.set_message(mcapp, UPGRADING_MESSAGE);
    INSTALLED.set_last_updated(mcapp, Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
}

pub fn set_installed_done(mcapp: &mut MultiClusterApp) {
    INSTALLED.set_true(mcapp);
    INSTALLED.set_message(mcapp, "");
}
