//! Configuration Module
//!
//! This module defines the configuration structures for the transfer validator.
//! Configuration is loaded from TOML files and parsed using serde. Every field
//! has a default, so an empty file is a valid configuration.

use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [validator]
/// check_finality = true
/// finalized_policy = "reject"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub validator: ValidatorConfig,
}

/// Transfer validation configuration
///
/// # Fields
/// - `check_finality`: Query the status lookup for the first signature at all
/// - `finalized_policy`: What to do when that signature is already finalized
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default = "default_check_finality")]
    pub check_finality: bool,
    #[serde(default)]
    pub finalized_policy: FinalizedPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            check_finality: default_check_finality(),
            finalized_policy: FinalizedPolicy::default(),
        }
    }
}

fn default_check_finality() -> bool {
    true
}

/// Handling of a transaction whose signature is already finalized
///
/// # Supported Policies
/// - `"reject"`: Fail with `AlreadyFinalized` (default)
/// - `"warn"`: Log a warning and accept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizedPolicy {
    #[default]
    Reject,
    Warn,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    ///
    /// # Example
    /// ```no_run
    /// let config = transfer_validator::Config::load("config/default.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.validator.check_finality);
        assert_eq!(config.validator.finalized_policy, FinalizedPolicy::Reject);
    }

    #[test]
    fn test_parse_warn_policy() {
        let config = Config::from_toml_str(
            r#"
            [validator]
            check_finality = false
            finalized_policy = "warn"
            "#,
        )
        .unwrap();
        assert!(!config.validator.check_finality);
        assert_eq!(config.validator.finalized_policy, FinalizedPolicy::Warn);
    }

    #[test]
    fn test_unknown_policy_is_an_error() {
        let result = Config::from_toml_str(
            r#"
            [validator]
            finalized_policy = "ignore"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_shipped_default_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();
        assert!(config.validator.check_finality);
        assert_eq!(config.validator.finalized_policy, FinalizedPolicy::Reject);
    }
}
