//! JADN namespace handling
//!
//! This module provides the prefix-to-package mapping declared in a
//! schema's `info.namespaces`. JADN allows it either as an object
//! (`{"ls": "http://..."}`) or as a list of pairs (`[["ls", "http://..."]]`);
//! the form read is the form written back.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Package identifier (usually a URI)
pub type PackageId = String;

/// Namespace prefix
pub type Prefix = String;

/// Namespace prefix to package mapping
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    prefixes: IndexMap<Prefix, PackageId>,
    /// Serialize as `[[prefix, package], ...]` instead of an object
    pairs: bool,
}

impl PartialEq for Namespaces {
    fn eq(&self, other: &Self) -> bool {
        self.prefixes == other.prefixes
    }
}

impl Eq for Namespaces {}

impl Namespaces {
    /// Create a new empty namespace mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, package: impl Into<String>) {
        self.prefixes.insert(prefix.into(), package.into());
    }

    /// Get the package for a prefix
    pub fn get_package(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Number of declared prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Check whether no prefixes are declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Check whether the mapping is written as a list of pairs
    pub fn is_pairs(&self) -> bool {
        self.pairs
    }

    /// Iterate over `(prefix, package)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Remove all prefix mappings
    pub fn clear(&mut self) {
        self.prefixes.clear();
    }
}

impl Serialize for Namespaces {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.pairs {
            let pairs: Vec<(&str, &str)> = self.iter().collect();
            pairs.serialize(serializer)
        } else {
            self.prefixes.serialize(serializer)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamespacesRepr {
    Map(IndexMap<Prefix, PackageId>),
    Pairs(Vec<(Prefix, PackageId)>),
}

impl<'de> Deserialize<'de> for Namespaces {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match NamespacesRepr::deserialize(deserializer)? {
            NamespacesRepr::Map(prefixes) => Self {
                prefixes,
                pairs: false,
            },
            NamespacesRepr::Pairs(pairs) => Self {
                prefixes: pairs.into_iter().collect(),
                pairs: true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut ns = Namespaces::new();
        ns.add_prefix("ls", "http://oasis-open.org/openc2/oc2ls-types/v1.1");

        assert_eq!(
            ns.get_package("ls"),
            Some("http://oasis-open.org/openc2/oc2ls-types/v1.1")
        );
        assert_eq!(ns.get_package("xx"), None);
        assert_eq!(ns.len(), 1);

        ns.clear();
        assert!(ns.is_empty());
    }

    #[test]
    fn test_deserialize_map_and_pairs() {
        let from_map: Namespaces =
            serde_json::from_str(r#"{"ls": "http://example.com/ls"}"#).unwrap();
        let from_pairs: Namespaces =
            serde_json::from_str(r#"[["ls", "http://example.com/ls"]]"#).unwrap();
        assert_eq!(from_map, from_pairs);
        assert!(!from_map.is_pairs());
        assert!(from_pairs.is_pairs());
    }

    #[test]
    fn test_serialize_keeps_source_form() {
        let map = r#"{"ls":"http://example.com/ls","sl":"http://example.com/sl"}"#;
        let pairs = r#"[["ls","http://example.com/ls"],["sl","http://example.com/sl"]]"#;

        let from_map: Namespaces = serde_json::from_str(map).unwrap();
        let from_pairs: Namespaces = serde_json::from_str(pairs).unwrap();
        assert_eq!(serde_json::to_string(&from_map).unwrap(), map);
        assert_eq!(serde_json::to_string(&from_pairs).unwrap(), pairs);
    }
}
