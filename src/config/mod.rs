//! Configuration loading and management

use crate::core::error::ManifoldResult;
use serde::{Deserialize, Serialize};

/// Configuration for the extension subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Factory identifiers to load eagerly at startup, in order
    #[serde(default)]
    pub factories: Vec<String>,

    /// Class names the filesystem loader may attempt; `None` allows all
    #[serde(default)]
    pub allow_list: Option<Vec<String>>,
}

impl ExtensionsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> ManifoldResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ManifoldResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Whether the allow-list admits a discovered class name
    ///
    /// A missing allow-list admits everything.
    pub fn allows(&self, class_name: &str) -> bool {
        match &self.allow_list {
            Some(list) => list.iter().any(|c| c == class_name),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
factories:
  - "api.hosts.Hosts"
  - "api.quota_classes.Quota_classes"
allow_list:
  - "Hosts"
"#;
        let config = ExtensionsConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.factories.len(), 2);
        assert_eq!(config.factories[0], "api.hosts.Hosts");
        assert!(config.allows("Hosts"));
        assert!(!config.allows("Quota_classes"));
    }

    #[test]
    fn test_defaults_when_fields_absent() {
        let config = ExtensionsConfig::from_yaml_str("{}").unwrap();
        assert!(config.factories.is_empty());
        assert!(config.allow_list.is_none());
        assert!(config.allows("Anything"));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ExtensionsConfig::from_yaml_str("factories: {bad").unwrap_err();
        assert!(matches!(err, crate::core::error::ManifoldError::Config(_)));
    }
}
