//! JADN base types
//!
//! Every type definition derives from exactly one of the twelve base types:
//! five primitives, two selectors and five structures.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Primitive base type names
pub const PRIMITIVE_TYPES: &[&str] = &["Binary", "Boolean", "Integer", "Number", "String"];

/// Selector base type names
pub const SELECTOR_TYPES: &[&str] = &["Enumerated", "Choice"];

/// Structure base type names
pub const STRUCTURED_TYPES: &[&str] = &["Array", "ArrayOf", "Map", "MapOf", "Record"];

/// Base types whose definitions carry a field (or item) list
pub const FIELD_TYPES: &[&str] = &["Array", "Choice", "Enumerated", "Map", "Record"];

/// JADN base type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// Sequence of octets
    Binary,
    /// true or false
    Boolean,
    /// Whole number
    Integer,
    /// Real number
    Number,
    /// Sequence of characters
    String,
    /// Vocabulary of items
    Enumerated,
    /// Discriminated union
    Choice,
    /// Ordered list of positional fields
    Array,
    /// Collection of values of one type
    ArrayOf,
    /// Unordered map of named fields
    Map,
    /// Map of keys of one type to values of one type
    MapOf,
    /// Ordered map of named fields
    Record,
}

impl BaseType {
    /// All base types in tag-table order
    pub const ALL: [BaseType; 12] = [
        BaseType::Binary,
        BaseType::Boolean,
        BaseType::Integer,
        BaseType::Number,
        BaseType::String,
        BaseType::Enumerated,
        BaseType::Choice,
        BaseType::Array,
        BaseType::ArrayOf,
        BaseType::Map,
        BaseType::MapOf,
        BaseType::Record,
    ];

    /// Get the base type as its schema name
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Binary => "Binary",
            BaseType::Boolean => "Boolean",
            BaseType::Integer => "Integer",
            BaseType::Number => "Number",
            BaseType::String => "String",
            BaseType::Enumerated => "Enumerated",
            BaseType::Choice => "Choice",
            BaseType::Array => "Array",
            BaseType::ArrayOf => "ArrayOf",
            BaseType::Map => "Map",
            BaseType::MapOf => "MapOf",
            BaseType::Record => "Record",
        }
    }

    /// Look up a base type by schema name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == name)
    }

    /// Check if this is a primitive type
    pub fn is_primitive(&self) -> bool {
        PRIMITIVE_TYPES.contains(&self.as_str())
    }

    /// Check if this is a selector type (`Enumerated`, `Choice`)
    pub fn is_selector(&self) -> bool {
        SELECTOR_TYPES.contains(&self.as_str())
    }

    /// Check if this is a structure type
    pub fn is_structure(&self) -> bool {
        STRUCTURED_TYPES.contains(&self.as_str())
    }

    /// Check if definitions of this type carry fields
    pub fn has_fields(&self) -> bool {
        FIELD_TYPES.contains(&self.as_str())
    }
}

impl FromStr for BaseType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseError::new(format!("Unknown base type '{}'", s)))
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a type reference names a primitive base type
pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(BaseType::from_name("Record"), Some(BaseType::Record));
        assert_eq!(BaseType::from_name("Null"), None);
        assert!("Foo".parse::<BaseType>().is_err());
        assert_eq!("MapOf".parse::<BaseType>().unwrap(), BaseType::MapOf);
    }

    #[test]
    fn test_categories() {
        assert!(BaseType::String.is_primitive());
        assert!(BaseType::Choice.is_selector());
        assert!(BaseType::Enumerated.is_selector());
        assert!(BaseType::ArrayOf.is_structure());
        assert!(!BaseType::ArrayOf.has_fields());
        assert!(BaseType::Enumerated.has_fields());
        assert!(!BaseType::Integer.has_fields());
    }

    #[test]
    fn test_every_base_type_round_trips_by_name() {
        for base in BaseType::ALL {
            assert_eq!(BaseType::from_name(base.as_str()), Some(base));
        }
        assert!(is_primitive_name("Binary"));
        assert!(!is_primitive_name("Record"));
    }
}
