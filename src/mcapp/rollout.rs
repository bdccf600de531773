// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Batched creation and update of the child Apps of a MultiClusterApp.

use crate::answers::{split_project_name, AnswersMap, ScopeAnswers};
use crate::constants::{annotations::CREATOR_ID, labels::MULTI_CLUSTER_APP_ID, UPGRADING_MESSAGE};
use crate::error::{Error, Result};
use crate::mcapp::manager::McAppManager;
use crate::retry::retry_on_conflict;
use crate::types::{App, AppSpec, MultiClusterApp, INSTALLED};
use chrono::{DateTime, TimeDelta, Utc};
use kube::api::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of one pass over the targets
#[derive(Debug)]
pub struct CreateAppsResponse {
    /// The MultiClusterApp, as stored after newly assigned app names were written
    pub object: MultiClusterApp,
    /// Target project names of `update_apps`, index for index
    pub projects: Vec<String>,
    /// Apps with stale answers selected for this batch
    pub update_apps: Vec<App>,
    /// Batch budget left after creations
    pub remaining: usize,
    /// Targets whose App was created this pass or already matches
    pub count: usize,
}

/// Whether the next batch may start. False while the Installed condition reports
/// an upgrade that started less than the rolling update interval ago.
pub fn to_update(mcapp: &MultiClusterApp, now: DateTime<Utc>) -> Result<bool> {
    let Some(started) = upgrade_started(mcapp)? else {
        return Ok(true);
    };
    match next_batch_at(mcapp, started) {
        Some(deadline) => Ok(now >= deadline),
        // Past the representable range: forever for a positive interval
        None => Ok(rollout_interval(mcapp) <= 0),
    }
}

/// Time until the running batch's interval passes, judged from the Installed condition.
/// Saturates to `Duration::MAX` when the deadline lies beyond the representable range.
pub fn remaining_interval(mcapp: &MultiClusterApp, now: DateTime<Utc>) -> Option<Duration> {
    let started = upgrade_started(mcapp).ok()??;
    match next_batch_at(mcapp, started) {
        Some(deadline) => deadline.signed_duration_since(now).to_std().ok(),
        None if rollout_interval(mcapp) > 0 => Some(Duration::MAX),
        None => None,
    }
}

fn next_batch_at(mcapp: &MultiClusterApp, started: DateTime<Utc>) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(rollout_interval(mcapp))
        .and_then(|interval| started.checked_add_signed(interval))
}

/// Apps touched per pass: every target, unless a rolling update with an interval limits it
pub fn batch_size(mcapp: &MultiClusterApp, to_update: bool) -> usize {
    match mcapp.rolling_update() {
        Some(rolling) if to_update && rolling.interval != 0 => {
            usize::try_from(rolling.batch_size).unwrap_or(0)
        }
        _ => mcapp.spec.targets.len(),
    }
}

fn rollout_interval(mcapp: &MultiClusterApp) -> i64 {
    mcapp.rolling_update().map(|r| r.interval).unwrap_or(0)
}

fn upgrade_started(mcapp: &MultiClusterApp) -> Result<Option<DateTime<Utc>>> {
    if !INSTALLED.is_unknown(mcapp) || INSTALLED.message(mcapp) != UPGRADING_MESSAGE {
        return Ok(None);
    }
    let raw = INSTALLED.last_updated(mcapp);
    let started = DateTime::parse_from_rfc3339(raw).map_err(|source| Error::InvalidTimestamp {
        value: raw.to_string(),
        source,
    })?;
    Ok(Some(started.with_timezone(&Utc)))
}

fn apply_scope(app: &mut App, scope: &ScopeAnswers, external_id: &str) {
    app.spec.answers = scope.answers.clone();
    app.spec.answers_set_string = scope.answers_set_string.clone();
    app.spec.external_id = external_id.to_string();
}

fn app_matches(app: &App, scope: &ScopeAnswers, external_id: &str) -> bool {
    app.spec.external_id == external_id
        && app.spec.answers == scope.answers
        && app.spec.answers_set_string == scope.answers_set_string
}

impl McAppManager {
    /// Resolve `<namespace>:<name>` of the template version to its external ID
    pub(crate) async fn get_external_id(&self, mcapp: &MultiClusterApp) -> Result<String> {
        let qualified = &mcapp.spec.template_version_name;
        let (namespace, name) = qualified
            .split_once(':')
            .ok_or_else(|| Error::InvalidTemplateVersion(qualified.clone()))?;

        let version = self
            .stores
            .catalog
            .get_template_version(namespace, name)
            .await?
            .ok_or_else(|| Error::TemplateVersionNotFound(qualified.clone()))?;
        Ok(version.spec.external_id)
    }

    /// Walk the targets in order: create missing Apps within `batch_size`, count
    /// Apps already matching, and collect stale Apps for the update batch.
    ///
    /// A matching App that is not yet healthy halts the rolling update for this pass.
    pub(crate) async fn create_apps(
        &self,
        mcapp: &MultiClusterApp,
        external_id: &str,
        answers: &AnswersMap,
        creator_id: &str,
        mut batch_size: usize,
        mut to_update: bool,
    ) -> Result<CreateAppsResponse> {
        let name = mcapp.name_any();
        let mut mcapp_to_update: Option<MultiClusterApp> = None;
        let mut update_apps = Vec::new();
        let mut projects = Vec::new();
        let mut update_batch_size = batch_size;
        let mut count = 0;

        for (index, target) in mcapp.spec.targets.iter().enumerate() {
            let (_, project_ns) = split_project_name(&target.project_name)?;

            if !target.app_name.is_empty() {
                let app = self
                    .stores
                    .apps
                    .get_app(project_ns, &target.app_name)
                    .await?
                    .ok_or_else(|| Error::AppNotFound {
                        namespace: project_ns.to_string(),
                        name: target.app_name.clone(),
                    })?;
                if app.labels().get(MULTI_CLUSTER_APP_ID) != Some(&name) {
                    return Err(Error::MissingAppLabel {
                        namespace: project_ns.to_string(),
                        name: target.app_name.clone(),
                    });
                }

                let scope = answers.scope_answers(&target.project_name);
                if app_matches(&app, &scope, external_id) {
                    count += 1;
                    if !app.is_healthy() {
                        debug!("App {}/{} is not healthy yet, pausing update", project_ns, target.app_name);
                        to_update = false;
                        update_apps.clear();
                        projects.clear();
                    }
                    continue;
                }
                if to_update && update_batch_size > 0 {
                    update_apps.push(app);
                    projects.push(target.project_name.clone());
                    update_batch_size -= 1;
                }
                continue;
            }

            if batch_size > 0 {
                let app_name = self
                    .create_app(mcapp, answers, creator_id, project_ns, external_id, &target.project_name)
                    .await?;
                if let Some(t) = mcapp_to_update
                    .get_or_insert_with(|| mcapp.clone())
                    .spec
                    .targets
                    .get_mut(index)
                {
                    t.app_name = app_name;
                }
                batch_size -= 1;
                count += 1;
            }
        }

        let object = match mcapp_to_update {
            Some(updated) if &updated != mcapp => {
                self.stores.mcapps.update_multicluster_app(&updated).await?
            }
            _ => mcapp.clone(),
        };

        Ok(CreateAppsResponse {
            object,
            projects,
            update_apps,
            remaining: batch_size,
            count,
        })
    }

    /// Create the App `<mcapp>-<projectNS>` unless it exists. Returns its name.
    async fn create_app(
        &self,
        mcapp: &MultiClusterApp,
        answers: &AnswersMap,
        creator_id: &str,
        project_ns: &str,
        external_id: &str,
        project_name: &str,
    ) -> Result<String> {
        let mcapp_name = mcapp.name_any();
        let app_name = format!("{}-{}", mcapp_name, project_ns);

        if let Some(existing) = self.stores.apps.get_app(project_ns, &app_name).await? {
            return Ok(existing.name_any());
        }

        let scope = answers.scope_answers(project_name);
        let app = App {
            metadata: ObjectMeta {
                name: Some(app_name.clone()),
                namespace: Some(project_ns.to_string()),
                annotations: Some(BTreeMap::from([(
                    CREATOR_ID.to_string(),
                    creator_id.to_string(),
                )])),
                labels: Some(BTreeMap::from([(
                    MULTI_CLUSTER_APP_ID.to_string(),
                    mcapp_name.clone(),
                )])),
                ..Default::default()
            },
            spec: AppSpec {
                project_name: project_name.to_string(),
                target_namespace: app_name.clone(),
                external_id: external_id.to_string(),
                multi_cluster_app_name: mcapp_name,
                answers: scope.answers,
                answers_set_string: scope.answers_set_string,
                wait: mcapp.spec.wait,
                timeout: mcapp.spec.timeout,
                ..Default::default()
            },
            status: None,
        };

        match self.stores.apps.create_app(&app).await {
            Ok(created) => {
                info!("Created app {}/{}", project_ns, created.name_any());
                Ok(created.name_any())
            }
            Err(e) if e.is_already_exists() => Ok(app_name),
            Err(e) => Err(e),
        }
    }

    /// Write the resolved answers and external ID to an App, retrying conflicts
    /// against the latest version of the App.
    pub(crate) async fn update_app(
        &self,
        app: &App,
        answers: &AnswersMap,
        external_id: &str,
        project_name: &str,
    ) -> Result<App> {
        let scope = answers.scope_answers(project_name);
        let mut desired = app.clone();
        apply_scope(&mut desired, &scope, external_id);

        match self.stores.apps.update_app(&desired).await {
            Err(e) if e.is_conflict() => {
                debug!("Conflict updating app {}, retrying on latest", app.name_any());
            }
            other => return other,
        }

        let (_, project_ns) = split_project_name(project_name)?;
        let apps = &self.stores.apps;
        let name = app.name_any();
        let name = name.as_str();
        let scope = &scope;

        retry_on_conflict(&self.retry, &self.cancel, "update_app", move || async move {
            let mut latest = apps
                .get_app(project_ns, name)
                .await?
                .ok_or_else(|| Error::AppNotFound {
                    namespace: project_ns.to_string(),
                    name: name.to_string(),
                })?;
            apply_scope(&mut latest, scope, external_id);
            apps.update_app(&latest).await
        })
        .await
    }
}
