// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of scoped answers into the values each target project receives.
//!
//! Global answers apply everywhere, cluster answers override them for every project
//! of that cluster, and project answers override both.

use crate::constants::GLOBAL_SCOPE_ANSWERS_KEY;
use crate::error::{Error, Result};
use crate::types::Answer;
use std::collections::{BTreeMap, HashMap};

pub type Values = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeAnswers {
    pub answers: Values,
    pub answers_set_string: Values,
}

impl ScopeAnswers {
    fn from_answer(answer: &Answer) -> Self {
        Self {
            answers: answer.values.clone(),
            answers_set_string: answer.values_set_string.clone(),
        }
    }

    /// Keys of `answer` win on conflict
    fn merged_with(&self, answer: &Answer) -> Self {
        Self {
            answers: merge(&self.answers, &answer.values),
            answers_set_string: merge(&self.answers_set_string, &answer.values_set_string),
        }
    }
}

/// Answers keyed by scope: `global`, a cluster name, or a `cluster:project` name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswersMap(HashMap<String, ScopeAnswers>);

impl AnswersMap {
    /// Answers for a target project: its own scope, else its cluster's, else the
    /// global scope, else nothing.
    pub fn scope_answers(&self, project_name: &str) -> ScopeAnswers {
        let cluster_name = project_name
            .split_once(':')
            .map(|(cluster, _)| cluster)
            .unwrap_or(project_name);

        [project_name, cluster_name, GLOBAL_SCOPE_ANSWERS_KEY]
            .iter()
            .find_map(|key| self.0.get(*key))
            .cloned()
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn get(&self, scope: &str) -> Option<&ScopeAnswers> {
        self.0.get(scope)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the scope map for a MultiClusterApp's answers.
///
/// Fails on a project-scoped answer whose name is not `cluster:project`.
pub fn create_answers_map(answers: &[Answer]) -> Result<AnswersMap> {
    let mut map = HashMap::new();

    let global = answers
        .iter()
        .rev()
        .find(|a| a.project_name.is_empty() && a.cluster_name.is_empty())
        .map(ScopeAnswers::from_answer);
    if let Some(global) = &global {
        map.insert(GLOBAL_SCOPE_ANSWERS_KEY.to_string(), global.clone());
    }
    let global = global.unwrap_or_default();

    for answer in answers.iter().filter(|a| !a.cluster_name.is_empty()) {
        map.insert(answer.cluster_name.clone(), global.merged_with(answer));
    }

    for answer in answers.iter().filter(|a| !a.project_name.is_empty()) {
        let (cluster_name, _) = split_project_name(&answer.project_name)?;
        let base = map.get(cluster_name).unwrap_or(&global);
        let scoped = base.merged_with(answer);
        map.insert(answer.project_name.clone(), scoped);
    }

    Ok(AnswersMap(map))
}

/// Split `cluster:project` into its parts
pub fn split_project_name(project_name: &str) -> Result<(&str, &str)> {
    project_name
        .split_once(':')
        .ok_or_else(|| Error::InvalidProjectName(project_name.to_string()))
}

fn merge(base: &Values, overrides: &Values) -> Values {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
