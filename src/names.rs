//! JADN name validation and utilities
//!
//! This module provides validation for type names, field names and
//! namespace identifiers, and splitting of namespace-qualified type
//! references (`prefix:TypeName`).

use crate::error::{ParseError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Default `$TypeName` pattern
pub const DEFAULT_TYPE_NAME: &str = r"^[A-Z][-$A-Za-z0-9]{0,63}$";

/// Default `$FieldName` pattern
pub const DEFAULT_FIELD_NAME: &str = r"^[a-z][_A-Za-z0-9]{0,63}$";

/// Default `$NSID` pattern
pub const DEFAULT_NSID: &str = r"^[A-Za-z][A-Za-z0-9]{0,7}$";

/// Separator between a namespace prefix and a type name
pub const NAMESPACE_SEPARATOR: char = ':';

static TYPE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_TYPE_NAME).unwrap());

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_FIELD_NAME).unwrap());

static NSID: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_NSID).unwrap());

/// Check if a string is a valid type name under the default pattern
pub fn is_valid_type_name(name: &str) -> bool {
    TYPE_NAME.is_match(name)
}

/// Check if a string is a valid field name under the default pattern
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME.is_match(name)
}

/// Check if a string is a valid namespace identifier under the default pattern
pub fn is_valid_nsid(name: &str) -> bool {
    NSID.is_match(name)
}

/// Check a name against a configured pattern, falling back to the
/// compiled default when the pattern is the default one
pub fn matches_pattern(pattern: &str, name: &str) -> Result<bool> {
    match pattern {
        DEFAULT_TYPE_NAME => Ok(is_valid_type_name(name)),
        DEFAULT_FIELD_NAME => Ok(is_valid_field_name(name)),
        DEFAULT_NSID => Ok(is_valid_nsid(name)),
        _ => {
            let re = Regex::new(pattern).map_err(|e| {
                ParseError::new(format!("Invalid name pattern '{}'", pattern))
                    .with_source(e.to_string())
            })?;
            Ok(re.is_match(name))
        }
    }
}

/// Validate a type name and return an error if invalid
pub fn validate_type_name(name: &str) -> Result<()> {
    if is_valid_type_name(name) {
        Ok(())
    } else {
        Err(ParseError::new(format!("Invalid type name: '{}'", name)).into())
    }
}

/// Validate a field name and return an error if invalid
pub fn validate_field_name(name: &str) -> Result<()> {
    if is_valid_field_name(name) {
        Ok(())
    } else {
        Err(ParseError::new(format!("Invalid field name: '{}'", name)).into())
    }
}

/// Split a type reference into namespace prefix and local name
pub fn split_qualified(reference: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = reference.split_once(NAMESPACE_SEPARATOR) {
        (Some(prefix), local)
    } else {
        (None, reference)
    }
}

/// Check whether a type reference carries a namespace prefix
pub fn is_qualified(reference: &str) -> bool {
    reference.contains(NAMESPACE_SEPARATOR)
}

/// Join a namespace prefix and a local name into a qualified reference
pub fn qualify(prefix: &str, name: &str) -> String {
    format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_type_name() {
        assert!(is_valid_type_name("OpenC2-Command"));
        assert!(is_valid_type_name("IPv4-Net"));
        assert!(is_valid_type_name("Enum-Target"));

        assert!(!is_valid_type_name(""));
        assert!(!is_valid_type_name("lower"));
        assert!(!is_valid_type_name("ns:Type"));
    }

    #[test]
    fn test_is_valid_field_name() {
        assert!(is_valid_field_name("src_port"));
        assert!(is_valid_field_name("ipv4_connection"));

        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("Upper"));
        assert!(!is_valid_field_name("has-dash"));
    }

    #[test]
    fn test_is_valid_nsid() {
        assert!(is_valid_nsid("ls"));
        assert!(is_valid_nsid("slpf"));
        assert!(!is_valid_nsid("toolongname"));
    }

    #[test]
    fn test_matches_custom_pattern() {
        assert!(matches_pattern(r"^[a-z]+$", "abc").unwrap());
        assert!(!matches_pattern(r"^[a-z]+$", "Abc").unwrap());
        assert!(matches_pattern(r"^[a-z", "abc").is_err());
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("Foo"), (None, "Foo"));
        assert_eq!(split_qualified("ns:Foo"), (Some("ns"), "Foo"));
        assert!(is_qualified("ns:Foo"));
        assert_eq!(qualify("ns", "Foo"), "ns:Foo");
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_type_name("Target").is_ok());
        assert!(validate_type_name("target").is_err());
        assert!(validate_field_name("target").is_ok());
    }
}
