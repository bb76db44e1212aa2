//! Schema metadata
//!
//! The `info` object of a JADN schema: package identity, namespace
//! declarations, exported types and the `config` overrides.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::names::{DEFAULT_FIELD_NAME, DEFAULT_NSID, DEFAULT_TYPE_NAME};
use crate::namespaces::Namespaces;

/// Default `$MaxBinary`
pub const DEFAULT_MAX_BINARY: usize = 255;

/// Default `$MaxString`
pub const DEFAULT_MAX_STRING: usize = 255;

/// Default `$MaxElements`
pub const DEFAULT_MAX_ELEMENTS: usize = 100;

/// Default `$Sys`
pub const DEFAULT_SYS: &str = "$";

/// Schema `info` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Unique package identifier, usually a URI
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Copyright notice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// SPDX license identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Namespace prefixes used by qualified type references
    #[serde(default, skip_serializing_if = "Namespaces::is_empty")]
    pub namespaces: Namespaces,
    /// Root types of the package
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    /// Schema-wide limits and name patterns
    #[serde(default, skip_serializing_if = "Config::is_empty")]
    pub config: Config,
    /// Members not modelled above, kept for round trips
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Info {
    /// Create an info section for a package
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Check whether nothing is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Schema `config` section
///
/// Only values present in the source are serialized; accessors fill in
/// the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "$MaxBinary", default, skip_serializing_if = "Option::is_none")]
    max_binary: Option<usize>,
    #[serde(rename = "$MaxString", default, skip_serializing_if = "Option::is_none")]
    max_string: Option<usize>,
    #[serde(rename = "$MaxElements", default, skip_serializing_if = "Option::is_none")]
    max_elements: Option<usize>,
    #[serde(rename = "$Sys", default, skip_serializing_if = "Option::is_none")]
    sys: Option<String>,
    #[serde(rename = "$TypeName", default, skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,
    #[serde(rename = "$FieldName", default, skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(rename = "$NSID", default, skip_serializing_if = "Option::is_none")]
    nsid: Option<String>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether no value is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Maximum Binary length in octets
    pub fn max_binary(&self) -> usize {
        self.max_binary.unwrap_or(DEFAULT_MAX_BINARY)
    }

    /// Maximum String length in characters
    pub fn max_string(&self) -> usize {
        self.max_string.unwrap_or(DEFAULT_MAX_STRING)
    }

    /// Maximum element count of collections
    pub fn max_elements(&self) -> usize {
        self.max_elements.unwrap_or(DEFAULT_MAX_ELEMENTS)
    }

    /// System character for generated names
    pub fn sys(&self) -> &str {
        self.sys.as_deref().unwrap_or(DEFAULT_SYS)
    }

    /// Type name pattern
    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or(DEFAULT_TYPE_NAME)
    }

    /// Field name pattern
    pub fn field_name(&self) -> &str {
        self.field_name.as_deref().unwrap_or(DEFAULT_FIELD_NAME)
    }

    /// Namespace identifier pattern
    pub fn nsid(&self) -> &str {
        self.nsid.as_deref().unwrap_or(DEFAULT_NSID)
    }

    /// Set `$MaxBinary`
    pub fn with_max_binary(mut self, max: usize) -> Self {
        self.max_binary = Some(max);
        self
    }

    /// Set `$MaxString`
    pub fn with_max_string(mut self, max: usize) -> Self {
        self.max_string = Some(max);
        self
    }

    /// Set `$MaxElements`
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// Set `$TypeName`
    pub fn with_type_name(mut self, pattern: impl Into<String>) -> Self {
        self.type_name = Some(pattern.into());
        self
    }

    /// Set `$FieldName`
    pub fn with_field_name(mut self, pattern: impl Into<String>) -> Self {
        self.field_name = Some(pattern.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.max_binary(), 255);
        assert_eq!(config.max_string(), 255);
        assert_eq!(config.max_elements(), 100);
        assert_eq!(config.sys(), "$");
        assert_eq!(config.type_name(), DEFAULT_TYPE_NAME);
        assert!(config.is_empty());
    }

    #[test]
    fn test_config_serializes_only_given_values() {
        let config: Config =
            serde_json::from_value(json!({"$MaxString": 1000, "$Custom": true})).unwrap();
        assert_eq!(config.max_string(), 1000);
        assert_eq!(config.max_binary(), 255);
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"$MaxString": 1000, "$Custom": true})
        );
    }

    #[test]
    fn test_info_round_trip() {
        let source = json!({
            "package": "http://example.com/test/v1.0",
            "title": "Test",
            "namespaces": {"ls": "http://example.com/ls"},
            "exports": ["Message"],
            "x-extra": 1
        });
        let info: Info = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(info.package, "http://example.com/test/v1.0");
        assert_eq!(info.namespaces.get_package("ls"), Some("http://example.com/ls"));
        assert_eq!(info.exports, vec!["Message".to_string()]);
        assert_eq!(serde_json::to_value(&info).unwrap(), source);
        assert!(Info::default().is_empty());
    }

    #[test]
    fn test_info_namespace_pairs_round_trip() {
        let source = json!({
            "package": "http://example.com/test/v1.0",
            "namespaces": [["ls", "http://example.com/ls"]]
        });
        let info: Info = serde_json::from_value(source.clone()).unwrap();
        assert!(info.namespaces.is_pairs());
        assert_eq!(serde_json::to_value(&info).unwrap(), source);
    }
}
