// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Resources carrying a list of status conditions
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

/// A named condition type with accessors mirroring how controllers read and stamp it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionType(pub &'static str);

pub const INSTALLED: ConditionType = ConditionType("Installed");
pub const DEPLOYED: ConditionType = ConditionType("Deployed");

impl ConditionType {
    pub fn find<'a, T: HasConditions>(&self, obj: &'a T) -> Option<&'a Condition> {
        obj.conditions().iter().find(|c| c.condition_type == self.0)
    }

    pub fn is_true<T: HasConditions>(&self, obj: &T) -> bool {
        self.find(obj).is_some_and(|c| c.status == "True")
    }

    /// A missing condition is not unknown
    pub fn is_unknown<T: HasConditions>(&self, obj: &T) -> bool {
        self.find(obj).is_some_and(|c| c.status == "Unknown")
    }

    pub fn message<'a, T: HasConditions>(&self, obj: &'a T) -> &'a str {
        self.find(obj)
            .and_then(|c| c.message.as_deref())
            .unwrap_or_default()
    }

    pub fn last_updated<'a, T: HasConditions>(&self, obj: &'a T) -> &'a str {
        self.find(obj)
            .and_then(|c| c.last_update_time.as_deref())
            .unwrap_or_default()
    }

    pub fn set_true<T: HasConditions>(&self, obj: &mut T) {
        self.set_status(obj, "True");
    }

    pub fn set_unknown<T: HasConditions>(&self, obj: &mut T) {
        self.set_status(obj, "Unknown");
    }

    pub fn set_message<T: HasConditions>(&self, obj: &mut T, message: &str) {
        self.find_or_create(obj).message = Some(message.to_string()).filter(|m| !m.is_empty());
    }

    pub fn set_last_updated<T: HasConditions>(&self, obj: &mut T, timestamp: String) {
        self.find_or_create(obj).last_update_time = Some(timestamp);
    }

    fn set_status<T: HasConditions>(&self, obj: &mut T, status: &str) {
        let cond = self.find_or_create(obj);
        if cond.status != status {
            cond.status = status.to_string();
            cond.last_transition_time = Some(chrono::Utc::now().to_rfc3339());
        }
    }

    fn find_or_create<'a, T: HasConditions>(&self, obj: &'a mut T) -> &'a mut Condition {
        let conditions = obj.conditions_mut();
        let idx = match conditions.iter().position(|c| c.condition_type == self.0) {
            Some(idx) => idx,
            None => {
                conditions.push(Condition {
                    condition_type: self.0.to_string(),
                    ..Default::default()
                });
                conditions.len() - 1
            }
        };
        &mut conditions[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Holder(Vec<Condition>);

    impl HasConditions for Holder {
        fn conditions(&self) -> &[Condition] {
            &self.0
        }
        fn conditions_mut(&mut self) -> &mut Vec<Condition> {
            &mut self.0
        }
    }

    #[test]
    fn test_missing_condition_is_neither_true_nor_unknown() {
        let holder = Holder::default();
        assert!(!INSTALLED.is_true(&holder));
        assert!(!INSTALLED.is_unknown(&holder));
        assert_eq!(INSTALLED.message(&holder), "");
    }

    #[test]
    fn test_set_creates_condition_once() {
        let mut holder = Holder::default();
        INSTALLED.set_unknown(&mut holder);
        INSTALLED.set_message(&mut holder, "upgrading");
        INSTALLED.set_true(&mut holder);

        assert_eq!(holder.0.len(), 1);
        assert!(INSTALLED.is_true(&holder));
        assert_eq!(INSTALLED.message(&holder), "upgrading");
    }

    #[test]
    fn test_empty_message_clears() {
        let mut holder = Holder::default();
        INSTALLED.set_message(&mut holder, "upgrading");
        INSTALLED.set_message(&mut holder, "");
        assert!(INSTALLED.find(&holder).unwrap().message.is_none());
    }

    #[test]
    fn test_conditions_are_independent() {
        let mut holder = Holder::default();
        INSTALLED.set_true(&mut holder);
        DEPLOYED.set_unknown(&mut holder);

        assert!(INSTALLED.is_true(&holder));
        assert!(DEPLOYED.is_unknown(&holder));
        assert!(!DEPLOYED.is_true(&holder));
    }
}
