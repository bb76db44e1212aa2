//! Fields and enumeration items
//!
//! Array-form shapes:
//!
//! - field: `[id, name, type_ref, options, description]`
//! - item:  `[id, value, description]`

use serde_json::{json, Value};

use crate::error::ParseError;
use crate::options::Options;

/// Field of an `Array`, `Choice`, `Map` or `Record` definition
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field id (position for Array/Record, tag for Choice/Map)
    pub id: i64,
    /// Field name
    pub name: String,
    /// Referenced type name (primitive, schema type or `prefix:Type`)
    pub type_ref: String,
    /// Field options, possibly including type options for the field type
    pub options: Options,
    /// Field description
    pub description: String,
}

impl Field {
    /// Create a field with no options
    pub fn new(id: i64, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            type_ref: type_ref.into(),
            options: Options::default(),
            description: String::new(),
        }
    }

    /// Set the options
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse an array-form field
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        let parts = value
            .as_array()
            .filter(|p| p.len() == 4 || p.len() == 5)
            .ok_or_else(|| {
                ParseError::new("Field must be [id, name, type, options, description]")
                    .with_source(value.to_string())
            })?;

        let id = parts[0].as_i64().ok_or_else(|| {
            ParseError::new("Field id must be an integer").with_source(value.to_string())
        })?;
        let name = expect_str(&parts[1], "Field name", value)?;
        let type_ref = expect_str(&parts[2], "Field type", value)?;
        let options = Options::from_value(&parts[3])
            .map_err(|e| e.with_location(format!("field '{}'", name)))?;
        let description = match parts.get(4) {
            Some(d) => expect_str(d, "Field description", value)?,
            None => String::new(),
        };

        Ok(Self {
            id,
            name,
            type_ref,
            options,
            description,
        })
    }

    /// Serialize to array form
    pub fn to_value(&self) -> Value {
        json!([
            self.id,
            self.name,
            self.type_ref,
            self.options.to_value(),
            self.description
        ])
    }

    /// Minimum occurrences; Choice alternatives are never required
    pub fn minc(&self, in_choice: bool) -> i64 {
        match self.options.minc {
            Some(minc) => minc,
            None if in_choice => 0,
            None => 1,
        }
    }

    /// Maximum occurrences; `None` when unbounded (`maxc` of zero or less)
    pub fn maxc(&self) -> Option<i64> {
        let maxc = self
            .options
            .maxc
            .unwrap_or_else(|| self.options.minc.unwrap_or(1).max(1));
        if maxc <= 0 {
            None
        } else {
            Some(maxc)
        }
    }

    /// Field must be present
    pub fn is_required(&self) -> bool {
        self.minc(false) >= 1
    }

    /// Field takes an array of values rather than a single value
    pub fn is_repeated(&self) -> bool {
        self.maxc() != Some(1)
    }
}

/// Item of an `Enumerated` definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    /// Item id
    pub id: i64,
    /// Item value (name)
    pub value: String,
    /// Item description
    pub description: String,
}

impl EnumItem {
    /// Create an item
    pub fn new(id: i64, value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            description: description.into(),
        }
    }

    /// Parse an array-form item
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        let parts = value
            .as_array()
            .filter(|p| p.len() == 2 || p.len() == 3)
            .ok_or_else(|| {
                ParseError::new("Item must be [id, value, description]")
                    .with_source(value.to_string())
            })?;

        let id = parts[0].as_i64().ok_or_else(|| {
            ParseError::new("Item id must be an integer").with_source(value.to_string())
        })?;
        let item = expect_str(&parts[1], "Item value", value)?;
        let description = match parts.get(2) {
            Some(d) => expect_str(d, "Item description", value)?,
            None => String::new(),
        };

        Ok(Self::new(id, item, description))
    }

    /// Serialize to array form
    pub fn to_value(&self) -> Value {
        json!([self.id, self.value, self.description])
    }
}

fn expect_str(part: &Value, what: &str, whole: &Value) -> Result<String, ParseError> {
    part.as_str()
        .map(str::to_string)
        .ok_or_else(|| ParseError::new(format!("{} must be a string", what)).with_source(whole.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_value() {
        let field = Field::from_value(&json!([1, "src_port", "Port", ["[0"], "Source port"])).unwrap();
        assert_eq!(field.id, 1);
        assert_eq!(field.name, "src_port");
        assert_eq!(field.type_ref, "Port");
        assert_eq!(field.options.minc, Some(0));
        assert!(!field.is_required());
        assert!(!field.is_repeated());
        assert_eq!(
            field.to_value(),
            json!([1, "src_port", "Port", ["[0"], "Source port"])
        );
    }

    #[test]
    fn test_field_cardinality() {
        let required = Field::new(1, "a", "String");
        assert!(required.is_required());
        assert_eq!(required.maxc(), Some(1));
        assert_eq!(required.minc(true), 0);

        let repeated = Field::new(2, "b", "String")
            .with_options(Options::parse(&["[1", "]0"]).unwrap());
        assert!(repeated.is_repeated());
        assert_eq!(repeated.maxc(), None);

        let pair = Field::new(3, "c", "String").with_options(Options::parse(&["[2"]).unwrap());
        assert_eq!(pair.maxc(), Some(2));
        assert!(pair.is_repeated());
    }

    #[test]
    fn test_field_from_value_errors() {
        assert!(Field::from_value(&json!([1, "a"])).is_err());
        assert!(Field::from_value(&json!(["1", "a", "String", [], ""])).is_err());
        assert!(Field::from_value(&json!([1, "a", "String", "[0", ""])).is_err());
    }

    #[test]
    fn test_item_from_value() {
        let item = EnumItem::from_value(&json!([15, "allow", ""])).unwrap();
        assert_eq!(item, EnumItem::new(15, "allow", ""));
        assert_eq!(item.to_value(), json!([15, "allow", ""]));
        assert!(EnumItem::from_value(&json!([15])).is_err());
    }
}
