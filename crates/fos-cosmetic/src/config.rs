//! Monitor configuration
//!
//! Loaded from TOML. Every field is optional and defaults to the
//! built-in constants, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::features::IGNORED_TAGS;
use crate::inject::SCRIPT_ID;

/// Attributes whose changes trigger a monitor cycle
pub const WATCHED_ATTRIBUTES: &[&str] = &["class", "id", "href"];

/// Errors that can occur while loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Settings shared by the monitor and the injection helper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Tags excluded from element updates and feature extraction
    #[serde(default = "default_ignored_tags")]
    pub ignored_tags: Vec<String>,

    /// Reserved `id` of injected script carriers; insertions of such
    /// nodes are never reported
    #[serde(default = "default_script_id")]
    pub script_id: String,

    /// Attributes observed for changes
    #[serde(default = "default_watched_attributes")]
    pub watched_attributes: Vec<String>,
}

fn default_ignored_tags() -> Vec<String> {
    IGNORED_TAGS.iter().map(|s| s.to_string()).collect()
}

fn default_script_id() -> String {
    SCRIPT_ID.to_string()
}

fn default_watched_attributes() -> Vec<String> {
    WATCHED_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ignored_tags: default_ignored_tags(),
            script_id: default_script_id(),
            watched_attributes: default_watched_attributes(),
        }
    }
}

impl MonitorConfig {
    /// Parse, normalize and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded monitor config");
        Ok(config)
    }

    /// Tag and attribute names are matched lowercased
    fn normalize(&mut self) {
        for name in self.ignored_tags.iter_mut().chain(self.watched_attributes.iter_mut()) {
            name.make_ascii_lowercase();
        }
    }

    /// Check invariants the monitor relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.script_id.is_empty() {
            return Err(ConfigError::Validation("script_id must not be empty".into()));
        }
        if self.watched_attributes.is_empty() {
            return Err(ConfigError::Validation(
                "watched_attributes must name at least one attribute".into(),
            ));
        }
        if let Some(blank) = self
            .ignored_tags
            .iter()
            .chain(&self.watched_attributes)
            .find(|name| name.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!("blank tag or attribute name: {blank:?}")));
        }
        Ok(())
    }

    /// Whether a tag name is in the ignored set
    pub fn is_ignored_tag(&self, tag: &str) -> bool {
        self.ignored_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_is_default() {
        let config = MonitorConfig::from_toml_str("").unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert!(config.is_ignored_tag("SCRIPT"));
        assert!(!config.is_ignored_tag("div"));
    }

    #[test]
    fn test_partial_override_is_normalized() {
        let config = MonitorConfig::from_toml_str(
            r#"
            ignored_tags = ["NOSCRIPT", "template"]
            script_id = "my-carrier"
            "#,
        )
        .unwrap();
        assert_eq!(config.ignored_tags, vec!["noscript", "template"]);
        assert_eq!(config.script_id, "my-carrier");
        assert_eq!(config.watched_attributes, vec!["class", "id", "href"]);
    }

    #[test]
    fn test_validation_errors() {
        let err = MonitorConfig::from_toml_str(r#"script_id = """#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = MonitorConfig::from_toml_str("watched_attributes = []").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = MonitorConfig::from_toml_str(r#"ignored_tags = [" "]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = MonitorConfig::from_toml_str("ignored_tags = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(&path, r#"watched_attributes = ["class"]"#).unwrap();

        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.watched_attributes, vec!["class"]);

        let missing = MonitorConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
