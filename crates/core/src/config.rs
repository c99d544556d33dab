//! Sync configuration.
//!
//! One immutable [`SyncConfig`] is loaded at startup and passed by reference
//! to every component; nothing reads ambient globals.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A structurally valid config with an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// ERP (XML-RPC) endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Target inventory system (REST) endpoint and token.
#[derive(Debug, Clone, Deserialize)]
pub struct NetboxConfig {
    pub url: String,
    pub token: String,
}

/// One classification rule: the device role to assign when any keyword
/// occurs in the product label.
///
/// Rules are evaluated in declaration order and the first match wins, so
/// more specific rules must come before catch-alls in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRule {
    pub name: String,
    pub keywords: Vec<String>,
}

fn default_site_id() -> i64 {
    1
}

fn default_u_height() -> u32 {
    2
}

/// Full run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub erp: ErpConfig,
    pub netbox: NetboxConfig,

    /// Brand keywords: used to filter source products, to extract the
    /// manufacturer prefix, and as the grouping key.
    pub brands: Vec<String>,

    /// Ordered role rules (first match wins).
    #[serde(default)]
    pub tag_rules: Vec<TagRule>,

    /// Storage-location substrings to include.
    #[serde(default)]
    pub locations: Vec<String>,

    /// Site every registered device is attached to.
    #[serde(default = "default_site_id")]
    pub site_id: i64,

    /// Rack-unit height assigned to newly created device types.
    #[serde(default = "default_u_height")]
    pub default_u_height: u32,
}

impl SyncConfig {
    /// Read and validate a config file (JSON).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a config document.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.erp.url.trim().is_empty() {
            return Err(ConfigError::Invalid("erp.url must not be empty".into()));
        }
        if self.erp.database.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "erp.database must not be empty".into(),
            ));
        }
        if self.netbox.url.trim().is_empty() {
            return Err(ConfigError::Invalid("netbox.url must not be empty".into()));
        }
        if self.netbox.token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "netbox.token must not be empty".into(),
            ));
        }
        if self.brands.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one brand keyword is required".into(),
            ));
        }
        for rule in &self.tag_rules {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::Invalid("tag rule with empty name".into()));
            }
            if rule.keywords.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "tag rule '{}' has no keywords",
                    rule.name
                )));
            }
        }
        if self.site_id <= 0 {
            return Err(ConfigError::Invalid("site_id must be positive".into()));
        }
        if self.default_u_height == 0 {
            return Err(ConfigError::Invalid(
                "default_u_height must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{
            "erp": {
                "url": "https://erp.example.org",
                "database": "prod",
                "username": "sync",
                "password": "secret"
            },
            "netbox": {
                "url": "https://netbox.example.org",
                "token": "abcdef"
            },
            "brands": ["Cisco", "Netgate"],
            "tag_rules": [
                { "name": "Access Point", "keywords": ["Cisco AP", "Access Point"] },
                { "name": "Firewall", "keywords": ["Netgate", "Firewall"] },
                { "name": "Switch", "keywords": ["Cisco"] }
            ],
            "locations": ["LA", "LH3"]
        }"#
    }

    #[test]
    fn parses_full_config() {
        let config = SyncConfig::from_json(sample()).unwrap();
        assert_eq!(config.brands, vec!["Cisco", "Netgate"]);
        assert_eq!(config.locations, vec!["LA", "LH3"]);
        assert_eq!(config.site_id, 1);
        assert_eq!(config.default_u_height, 2);
    }

    #[test]
    fn tag_rule_order_is_preserved() {
        let config = SyncConfig::from_json(sample()).unwrap();
        let names: Vec<_> = config.tag_rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Access Point", "Firewall", "Switch"]);
    }

    #[test]
    fn rejects_empty_brand_list() {
        let raw = sample().replace(r#"["Cisco", "Netgate"]"#, "[]");
        let err = SyncConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_rule_without_keywords() {
        let raw = sample().replace(r#"["Cisco AP", "Access Point"]"#, "[]");
        let err = SyncConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_blank_token() {
        let raw = sample().replace(r#""token": "abcdef""#, r#""token": "  ""#);
        let err = SyncConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn site_and_height_can_be_overridden() {
        let raw = sample().replace(
            r#""locations": ["LA", "LH3"]"#,
            r#""locations": [], "site_id": 7, "default_u_height": 1"#,
        );
        let config = SyncConfig::from_json(&raw).unwrap();
        assert_eq!(config.site_id, 7);
        assert_eq!(config.default_u_height, 1);
    }
}
