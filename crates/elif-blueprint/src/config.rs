//! Factory configuration types and builders

use serde::{Deserialize, Serialize};
use service_builder::builder;

/// Recursion depth allowed before model creation fails
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What happens when a policy fails during model creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyErrorMode {
    /// Abort model creation with the policy error
    #[default]
    FailFast,
    /// Log the failure, keep it for inspection and continue
    Collect,
}

/// What happens when a blueprint is registered twice for one model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateBlueprintMode {
    /// The last registration wins
    #[default]
    Replace,
    /// Registration fails
    Reject,
}

/// Configuration for a [`ModelFactory`](crate::factory::ModelFactory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder]
pub struct FactoryConfig {
    /// Handling of policy failures during model creation
    #[builder(default = "PolicyErrorMode::FailFast", getter)]
    #[serde(default)]
    pub policy_errors: PolicyErrorMode,

    /// Maximum nesting of model creation (None = unbounded)
    #[builder(default = "Some(DEFAULT_MAX_DEPTH)", getter)]
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,

    /// Handling of repeated registrations for one model type
    #[builder(default = "DuplicateBlueprintMode::Replace", getter)]
    #[serde(default)]
    pub duplicate_blueprints: DuplicateBlueprintMode,
}

fn default_max_depth() -> Option<usize> {
    Some(DEFAULT_MAX_DEPTH)
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            policy_errors: PolicyErrorMode::FailFast,
            max_depth: default_max_depth(),
            duplicate_blueprints: DuplicateBlueprintMode::Replace,
        }
    }
}

impl FactoryConfigBuilder {
    /// Fail on policy errors and reject duplicate blueprints
    pub fn strict() -> Self {
        FactoryConfigBuilder::new()
            .policy_errors(PolicyErrorMode::FailFast)
            .duplicate_blueprints(DuplicateBlueprintMode::Reject)
            .max_depth(Some(DEFAULT_MAX_DEPTH))
    }

    /// Collect policy errors and let later blueprints replace earlier ones
    pub fn lenient() -> Self {
        FactoryConfigBuilder::new()
            .policy_errors(PolicyErrorMode::Collect)
            .duplicate_blueprints(DuplicateBlueprintMode::Replace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_config_defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.policy_errors, PolicyErrorMode::FailFast);
        assert_eq!(config.max_depth, Some(DEFAULT_MAX_DEPTH));
        assert_eq!(config.duplicate_blueprints, DuplicateBlueprintMode::Replace);
    }

    #[test]
    fn test_factory_config_builder() {
        let config = FactoryConfigBuilder::new()
            .max_depth(Some(8))
            .build()
            .expect("Failed to build config");

        assert_eq!(*config.get_max_depth(), Some(8));
        assert_eq!(*config.get_policy_errors(), PolicyErrorMode::FailFast); // Default
    }

    #[test]
    fn test_strict_config() {
        let config = FactoryConfigBuilder::strict()
            .build()
            .expect("Failed to build config");
        assert_eq!(*config.get_duplicate_blueprints(), DuplicateBlueprintMode::Reject);
        assert_eq!(*config.get_policy_errors(), PolicyErrorMode::FailFast);
    }

    #[test]
    fn test_lenient_config() {
        let config = FactoryConfigBuilder::lenient()
            .build()
            .expect("Failed to build config");
        assert_eq!(*config.get_policy_errors(), PolicyErrorMode::Collect);
        assert_eq!(*config.get_max_depth(), Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn test_config_from_json() {
        let config: FactoryConfig =
            serde_json::from_str(r#"{"policy_errors": "collect", "max_depth": null}"#).unwrap();
        assert_eq!(config.policy_errors, PolicyErrorMode::Collect);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.duplicate_blueprints, DuplicateBlueprintMode::Replace);

        let config: FactoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FactoryConfig::default());
    }
}
