use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::FeatureFlagPayload;

/// Reserved evaluation-context keys.
pub const TARGETING_KEY: &str = "targetingKey";
pub const GROUPS_KEY: &str = "groups";
pub const PROPERTIES_KEY: &str = "properties";

/// Group assignments in PostHog's native shape: group type to group key.
pub type Groups = HashMap<String, serde_json::Value>;

/// A PostHog property bag.
pub type Properties = HashMap<String, serde_json::Value>;

/// Property overrides for a lookup, split into per-group-type properties and
/// properties of the person being evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostHogProperties {
    pub group_properties: HashMap<String, Properties>,
    pub person_properties: Properties,
}

/// A single value stored in the evaluation context. The `Groups` and
/// `Properties` variants carry PostHog-native structures unchanged; the
/// context performs no shape conversion, only a variant check at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Groups(Groups),
    Properties(PostHogProperties),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("missing target key in evaluation context")]
    MissingTargetingKey,

    #[error("invalid target key in evaluation context")]
    InvalidTargetingKey,

    #[error("invalid groups in evaluation context")]
    InvalidGroups,

    #[error("invalid properties in evaluation context")]
    InvalidProperties,
}

/// Per-call targeting data supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    values: HashMap<String, ContextValue>,
}

impl EvaluationContext {
    /// Context with only the targeting key (the PostHog distinct id) set.
    pub fn new(targeting_key: impl Into<String>) -> Self {
        Self::default().with_value(TARGETING_KEY, ContextValue::String(targeting_key.into()))
    }

    pub fn with_value(mut self, key: impl Into<String>, value: ContextValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn with_groups(self, groups: Groups) -> Self {
        self.with_value(GROUPS_KEY, ContextValue::Groups(groups))
    }

    pub fn with_properties(self, properties: PostHogProperties) -> Self {
        self.with_value(PROPERTIES_KEY, ContextValue::Properties(properties))
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Translate this context into the lookup request for one flag.
    ///
    /// The targeting key is required and must be a string. Groups and
    /// properties are optional but must carry their matching variants; a
    /// wrong variant fails rather than being converted.
    pub fn to_payload(&self, flag_key: &str) -> Result<FeatureFlagPayload, ContextError> {
        let distinct_id = match self.values.get(TARGETING_KEY) {
            Some(ContextValue::String(id)) => id.clone(),
            Some(_) => return Err(ContextError::InvalidTargetingKey),
            None => return Err(ContextError::MissingTargetingKey),
        };

        let groups = match self.values.get(GROUPS_KEY) {
            Some(ContextValue::Groups(groups)) => groups.clone(),
            Some(_) => return Err(ContextError::InvalidGroups),
            None => Groups::default(),
        };

        let properties = match self.values.get(PROPERTIES_KEY) {
            Some(ContextValue::Properties(properties)) => properties.clone(),
            Some(_) => return Err(ContextError::InvalidProperties),
            None => PostHogProperties::default(),
        };

        Ok(FeatureFlagPayload {
            key: flag_key.to_string(),
            distinct_id,
            groups,
            group_properties: properties.group_properties,
            person_properties: properties.person_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_context_translates() {
        let ctx = EvaluationContext::new("user-1");
        let payload = ctx.to_payload("dark-mode").unwrap();

        assert_eq!(payload.key, "dark-mode");
        assert_eq!(payload.distinct_id, "user-1");
        assert!(payload.groups.is_empty());
        assert!(payload.group_properties.is_empty());
        assert!(payload.person_properties.is_empty());
    }

    #[test]
    fn groups_and_properties_carried_through_unchanged() {
        let groups = Groups::from([("company".to_string(), json!("acme"))]);
        let properties = PostHogProperties {
            group_properties: HashMap::from([(
                "company".to_string(),
                Properties::from([("plan".to_string(), json!("enterprise"))]),
            )]),
            person_properties: Properties::from([("email".to_string(), json!("jane@acme.io"))]),
        };

        let ctx = EvaluationContext::new("user-1")
            .with_groups(groups.clone())
            .with_properties(properties.clone());
        let payload = ctx.to_payload("dark-mode").unwrap();

        assert_eq!(payload.groups, groups);
        assert_eq!(payload.group_properties, properties.group_properties);
        assert_eq!(payload.person_properties, properties.person_properties);
    }

    #[test]
    fn missing_targeting_key_fails() {
        let ctx = EvaluationContext::default();
        assert_eq!(
            ctx.to_payload("dark-mode"),
            Err(ContextError::MissingTargetingKey)
        );
    }

    #[test]
    fn non_string_targeting_key_fails() {
        let ctx = EvaluationContext::default().with_value(TARGETING_KEY, ContextValue::Int(7));
        assert_eq!(
            ctx.to_payload("dark-mode"),
            Err(ContextError::InvalidTargetingKey)
        );
    }

    #[test]
    fn wrong_groups_variant_fails() {
        let ctx = EvaluationContext::new("user-1")
            .with_value(GROUPS_KEY, ContextValue::String("acme".to_string()));
        assert_eq!(ctx.to_payload("dark-mode"), Err(ContextError::InvalidGroups));
    }

    #[test]
    fn wrong_properties_variant_fails() {
        let ctx = EvaluationContext::new("user-1")
            .with_value(PROPERTIES_KEY, ContextValue::Bool(true));
        assert_eq!(
            ctx.to_payload("dark-mode"),
            Err(ContextError::InvalidProperties)
        );
    }

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            ContextError::MissingTargetingKey.to_string(),
            "missing target key in evaluation context"
        );
        assert_eq!(
            ContextError::InvalidGroups.to_string(),
            "invalid groups in evaluation context"
        );
        assert_eq!(
            ContextError::InvalidProperties.to_string(),
            "invalid properties in evaluation context"
        );
    }
}
