//! Instance validation
//!
//! Checks a JSON instance against a named type of a [`Schema`]. The
//! instance is expanded to verbose form once, then walked recursively.
//! At every node the checks run in a fixed order:
//!
//! 1. shape and format
//! 2. member presence and cardinality
//! 3. nested members
//! 4. aggregate count bounds
//!
//! The first failure is returned; its path lists the type and member
//! segments from the validated root down to the failing node.

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tracing::trace;

use super::formats;
use crate::definitions::{BaseType, Field, Kind, TypeDefinition};
use crate::error::ValidationError;
use crate::limits::Limits;
use crate::schema::{Config, Schema};

type Outcome = std::result::Result<(), ValidationError>;

/// Validate `instance` against the type named `type_name`
pub fn validate(schema: &Schema, type_name: &str, instance: &Value) -> Outcome {
    let def = schema
        .lookup(type_name)
        .ok_or_else(|| ValidationError::unknown_type(type_name))?;
    let expanded = def.expand(schema, instance);
    Validator::new(schema)
        .check(def, &expanded, 0)
        .map_err(|e| e.within(type_name))
}

/// Recursive validator over one schema
pub struct Validator<'a> {
    schema: &'a Schema,
    config: &'a Config,
    limits: &'a Limits,
}

impl<'a> Validator<'a> {
    /// Create a validator using the schema's config and limits
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            config: schema.config(),
            limits: schema.limits(),
        }
    }

    /// Validate an already expanded value against a definition
    pub fn check(&self, def: &TypeDefinition, value: &Value, depth: usize) -> Outcome {
        self.limits
            .check_depth(depth)
            .map_err(|_| ValidationError::recursion_limit(def.name(), self.limits.max_depth))?;
        trace!(type_name = def.name(), base = %def.base_type(), depth, "validating node");

        match def.kind() {
            Kind::Binary => self.check_binary(def, value),
            Kind::Boolean => match value {
                Value::Bool(_) => Ok(()),
                other => Err(shape(def, "expected a boolean", other)),
            },
            Kind::Integer => self.check_integer(def, value),
            Kind::Number => self.check_number(def, value),
            Kind::String => self.check_string(def, value),
            Kind::Enumerated(_) => self.check_enumerated(def, value),
            Kind::Choice(_) => self.check_choice(def, value, depth),
            Kind::Array(fields) => self.check_array(def, fields, value, depth),
            Kind::ArrayOf => self.check_array_of(def, value, depth),
            Kind::Map(_) | Kind::Record(_) => self.check_map(def, value, depth),
            Kind::MapOf => self.check_map_of(def, value, depth),
        }
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    fn check_binary(&self, def: &TypeDefinition, value: &Value) -> Outcome {
        let format = def.options().format.as_deref();
        let octets = match value {
            Value::String(text) => formats::decode_binary(format, text)
                .map_err(|e| e.with_type_name(def.name()))?,
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().filter(|b| *b <= 255).map(|b| b as u8))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| shape(def, "expected an array of octets", value))?,
            other => return Err(shape(def, "expected a binary string", other)),
        };
        if let Some(format) = format {
            formats::binary_length(format, octets.len()).map_err(|e| e.with_type_name(def.name()))?;
        }
        self.check_length(def, octets.len(), self.config.max_binary(), "octets")
    }

    fn check_integer(&self, def: &TypeDefinition, value: &Value) -> Outcome {
        let n = match value {
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .ok_or_else(|| shape(def, "expected an integer", value))?,
            other => return Err(shape(def, "expected an integer", other)),
        };
        let opts = def.options();
        if let Some(format) = &opts.format {
            formats::integer_format(format, n).map_err(|e| e.with_type_name(def.name()))?;
        }
        if let Some(min) = opts.minv {
            if n < i128::from(min) {
                return Err(ValidationError::constraint(def.name(), "value is below minimum")
                    .with_expected(format!(">= {}", min))
                    .with_actual(n));
            }
        }
        if let Some(max) = opts.maxv.filter(|m| *m != 0) {
            if n > i128::from(max) {
                return Err(ValidationError::constraint(def.name(), "value exceeds maximum")
                    .with_expected(format!("<= {}", max))
                    .with_actual(n));
            }
        }
        Ok(())
    }

    fn check_number(&self, def: &TypeDefinition, value: &Value) -> Outcome {
        let n = value
            .as_f64()
            .ok_or_else(|| shape(def, "expected a number", value))?;
        let opts = def.options();
        if let Some(format) = &opts.format {
            formats::number_format(format).map_err(|e| e.with_type_name(def.name()))?;
        }
        if let Some(min) = opts.minf {
            if n < min {
                return Err(ValidationError::constraint(def.name(), "value is below minimum")
                    .with_expected(format!(">= {}", min))
                    .with_actual(n));
            }
        }
        if let Some(max) = opts.maxf.filter(|m| *m != 0.0) {
            if n > max {
                return Err(ValidationError::constraint(def.name(), "value exceeds maximum")
                    .with_expected(format!("<= {}", max))
                    .with_actual(n));
            }
        }
        Ok(())
    }

    fn check_string(&self, def: &TypeDefinition, value: &Value) -> Outcome {
        let text = value
            .as_str()
            .ok_or_else(|| shape(def, "expected a string", value))?;
        let opts = def.options();
        if let Some(format) = &opts.format {
            formats::string_format(format, text).map_err(|e| e.with_type_name(def.name()))?;
        }
        if let Some(pattern) = &opts.pattern {
            let compiled;
            let re = match self.schema.pattern(pattern) {
                Some(re) => re,
                None => {
                    compiled = formats::compile_pattern(pattern).map_err(|e| {
                        ValidationError::constraint(def.name(), format!("invalid pattern '{}'", pattern))
                            .with_reason(e.to_string())
                    })?;
                    &compiled
                }
            };
            formats::pattern(re, text).map_err(|e| e.with_type_name(def.name()))?;
        }
        self.check_length(def, text.chars().count(), self.config.max_string(), "characters")
    }

    fn check_length(&self, def: &TypeDefinition, len: usize, default_max: usize, unit: &str) -> Outcome {
        let opts = def.options();
        let min = opts.minv.unwrap_or(0).max(0) as usize;
        let max = opts
            .maxv
            .filter(|m| *m > 0)
            .map(|m| m as usize)
            .unwrap_or(default_max);
        if len < min {
            return Err(ValidationError::constraint(def.name(), "length is below minimum")
                .with_expected(format!(">= {} {}", min, unit))
                .with_actual(len));
        }
        if len > max {
            return Err(ValidationError::constraint(def.name(), "length exceeds maximum")
                .with_expected(format!("<= {} {}", max, unit))
                .with_actual(len));
        }
        Ok(())
    }

    // =========================================================================
    // Selectors
    // =========================================================================

    fn check_enumerated(&self, def: &TypeDefinition, value: &Value) -> Outcome {
        let items = def.items();
        let found = if def.options().id {
            let id = value
                .as_i64()
                .ok_or_else(|| shape(def, "expected an item id", value))?;
            items.iter().any(|item| item.id == id)
        } else {
            let text = value
                .as_str()
                .ok_or_else(|| shape(def, "expected an item value", value))?;
            items.iter().any(|item| item.value == text)
        };
        if found {
            Ok(())
        } else {
            Err(ValidationError::constraint(def.name(), "value is not a declared item")
                .with_actual(value))
        }
    }

    fn check_choice(&self, def: &TypeDefinition, value: &Value, depth: usize) -> Outcome {
        let members = match value {
            Value::String(name) if def.field_by_name(name).is_some() => return Ok(()),
            Value::Object(members) => members,
            other => return Err(shape(def, "expected an object with one alternative", other)),
        };
        if members.len() != 1 {
            return Err(ValidationError::shape(def.name(), "exactly one alternative must be present")
                .with_expected(1)
                .with_actual(members.len()));
        }
        let (key, member) = members
            .iter()
            .next()
            .ok_or_else(|| ValidationError::shape(def.name(), "no alternative present"))?;
        let field = def.field_by_key(key).ok_or_else(|| {
            ValidationError::shape(def.name(), "unknown alternative").with_field(key.as_str())
        })?;
        self.check_field(def, field, member, depth)
            .map_err(|e| e.within(key.as_str()))
    }

    // =========================================================================
    // Structures
    // =========================================================================

    fn check_array(&self, def: &TypeDefinition, fields: &[Field], value: &Value, depth: usize) -> Outcome {
        let split;
        let value = match &def.options().format {
            Some(format) => {
                split = formats::split_array(format, value).map_err(|e| e.with_type_name(def.name()))?;
                &split
            }
            None => value,
        };
        let values = value
            .as_array()
            .ok_or_else(|| shape(def, "expected an array", value))?;
        if values.len() > fields.len() {
            return Err(ValidationError::shape(def.name(), "too many values")
                .with_expected(format!("<= {}", fields.len()))
                .with_actual(values.len()));
        }

        for (i, field) in fields.iter().enumerate() {
            let present = values.get(i).map_or(false, |v| !v.is_null());
            if !present && field.is_required() {
                return Err(missing(def, field));
            }
        }

        for (field, v) in fields.iter().zip(values) {
            if !v.is_null() {
                self.check_field(def, field, v, depth)
                    .map_err(|e| e.within(field.name.as_str()))?;
            }
        }

        let last_required = fields.iter().rposition(Field::is_required).map_or(0, |i| i + 1);
        let min = def.options().minv.map_or(last_required, |m| m.max(0) as usize);
        let max = def
            .options()
            .maxv
            .filter(|m| *m > 0)
            .map_or(fields.len(), |m| m as usize);
        self.check_count(def, values.len(), min, max)
    }

    fn check_array_of(&self, def: &TypeDefinition, value: &Value, depth: usize) -> Outcome {
        let vtype = self.member_type(def, "vtype", def.options().vtype.as_deref())?;
        let values = value
            .as_array()
            .ok_or_else(|| shape(def, "expected an array", value))?;
        self.check_hard_cap(def, values.len())?;

        for (i, v) in values.iter().enumerate() {
            self.check(vtype, v, depth + 1)
                .map_err(|e| e.within(i.to_string()))?;
        }

        if def.options().is_unique() {
            for (i, v) in values.iter().enumerate() {
                if values[..i].contains(v) {
                    return Err(ValidationError::constraint(def.name(), "duplicate element")
                        .with_actual(v));
                }
            }
        }

        self.check_count(def, values.len(), self.min_count(def), self.max_count(def))
    }

    fn check_map(&self, def: &TypeDefinition, value: &Value, depth: usize) -> Outcome {
        let positional;
        let members = match value {
            Value::Object(members) => members,
            Value::Array(values) if def.base_type() == BaseType::Record => {
                positional = self.record_members(def, values)?;
                &positional
            }
            other => return Err(shape(def, "expected an object", other)),
        };
        self.check_hard_cap(def, members.len())?;

        let by_id = def.options().id;
        let mut given = HashSet::new();
        for key in members.keys() {
            match def.field_by_key(key) {
                Some(field) if !given.insert(field.id) => {
                    return Err(ValidationError::shape(def.name(), "field given more than once")
                        .with_field(key.as_str()));
                }
                Some(_) => {}
                None if def.options().extend => {}
                None => {
                    return Err(ValidationError::constraint(def.name(), "unknown field")
                        .with_field(key.as_str()));
                }
            }
        }
        for field in def.fields() {
            let key = member_key(field, by_id);
            let present = members.get(&key).map_or(false, |v| !v.is_null());
            if !present && field.is_required() {
                return Err(missing(def, field));
            }
        }

        for field in def.fields() {
            let key = member_key(field, by_id);
            if let Some(v) = members.get(&key).filter(|v| !v.is_null()) {
                self.check_field(def, field, v, depth)
                    .map_err(|e| e.within(key.as_str()))?;
            }
        }

        self.check_count(def, members.len(), self.min_count(def), self.max_count(def))
    }

    fn check_map_of(&self, def: &TypeDefinition, value: &Value, depth: usize) -> Outcome {
        let ktype = self.member_type(def, "ktype", def.options().ktype.as_deref())?;
        let vtype = self.member_type(def, "vtype", def.options().vtype.as_deref())?;

        let pairs: Vec<(Value, &Value)> = match value {
            Value::Object(members) => members
                .iter()
                .map(|(k, v)| (key_value(ktype, k), v))
                .collect(),
            Value::Array(flat) if flat.len() % 2 == 0 => flat
                .chunks(2)
                .map(|pair| (pair[0].clone(), &pair[1]))
                .collect(),
            other => return Err(shape(def, "expected an object or key/value array", other)),
        };
        self.check_hard_cap(def, pairs.len())?;

        for (key, v) in &pairs {
            let segment = match key {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.check(ktype, key, depth + 1)
                .map_err(|e| e.within(segment.as_str()))?;
            self.check(vtype, v, depth + 1)
                .map_err(|e| e.within(segment.as_str()))?;
        }

        self.check_count(def, pairs.len(), self.min_count(def), self.max_count(def))
    }

    // =========================================================================
    // Fields
    // =========================================================================

    fn check_field(&self, owner: &TypeDefinition, field: &Field, value: &Value, depth: usize) -> Outcome {
        let def = self.schema.field_type(owner.name(), field).ok_or_else(|| {
            ValidationError::unknown_type(&field.type_ref).with_field(field.name.as_str())
        })?;

        if !field.is_repeated() {
            return self.check(def, value, depth + 1);
        }

        let values = value.as_array().ok_or_else(|| {
            ValidationError::shape(owner.name(), "repeated field expects an array")
                .with_field(field.name.as_str())
                .with_actual(value)
        })?;
        let min = field.minc(false).max(1) as usize;
        let max = field
            .maxc()
            .map_or(self.config.max_elements(), |m| m as usize);
        if values.len() < min || values.len() > max {
            return Err(ValidationError::constraint(owner.name(), "field cardinality violated")
                .with_field(field.name.as_str())
                .with_expected(format!("{}..{}", min, max))
                .with_actual(values.len()));
        }
        for (i, v) in values.iter().enumerate() {
            self.check(def, v, depth + 1)
                .map_err(|e| e.within(i.to_string()))?;
        }
        Ok(())
    }

    fn record_members(&self, def: &TypeDefinition, values: &[Value]) -> std::result::Result<Map<String, Value>, ValidationError> {
        let fields = def.fields();
        if values.len() > fields.len() {
            return Err(ValidationError::shape(def.name(), "too many values")
                .with_expected(format!("<= {}", fields.len()))
                .with_actual(values.len()));
        }
        Ok(fields
            .iter()
            .zip(values)
            .filter(|(_, v)| !v.is_null())
            .map(|(f, v)| (member_key(f, def.options().id), v.clone()))
            .collect())
    }

    fn member_type(&self, def: &TypeDefinition, what: &str, reference: Option<&str>) -> std::result::Result<&'a TypeDefinition, ValidationError> {
        let reference = reference.ok_or_else(|| {
            ValidationError::constraint(def.name(), format!("{} is not set", what))
        })?;
        self.schema.lookup(reference).ok_or_else(|| {
            ValidationError::constraint(def.name(), format!("{} '{}' is not defined", what, reference))
                .with_reason(format!("unknown type '{}'", reference))
        })
    }

    fn min_count(&self, def: &TypeDefinition) -> usize {
        def.options().minv.unwrap_or(0).max(0) as usize
    }

    fn max_count(&self, def: &TypeDefinition) -> usize {
        def.options()
            .maxv
            .filter(|m| *m > 0)
            .map_or(self.config.max_elements(), |m| m as usize)
    }

    fn check_count(&self, def: &TypeDefinition, len: usize, min: usize, max: usize) -> Outcome {
        if len < min {
            return Err(ValidationError::constraint(def.name(), "too few elements")
                .with_expected(format!(">= {}", min))
                .with_actual(len));
        }
        if len > max {
            return Err(ValidationError::constraint(def.name(), "too many elements")
                .with_expected(format!("<= {}", max))
                .with_actual(len));
        }
        Ok(())
    }

    fn check_hard_cap(&self, def: &TypeDefinition, len: usize) -> Outcome {
        self.limits.check_collection_size(len).map_err(|e| {
            ValidationError::constraint(def.name(), "collection exceeds hard limit")
                .with_actual(len)
                .with_reason(e.to_string())
        })
    }
}

fn shape(def: &TypeDefinition, message: &str, actual: &Value) -> ValidationError {
    ValidationError::shape(def.name(), message).with_actual(actual)
}

fn missing(def: &TypeDefinition, field: &Field) -> ValidationError {
    ValidationError::constraint(def.name(), "missing required field").with_field(field.name.as_str())
}

fn member_key(field: &Field, by_id: bool) -> String {
    if by_id {
        field.id.to_string()
    } else {
        field.name.clone()
    }
}

/// Object keys are strings; numeric key types get them back as numbers
fn key_value(ktype: &TypeDefinition, key: &str) -> Value {
    match ktype.base_type() {
        BaseType::Integer => key.parse::<i64>().map(Value::from).unwrap_or_else(|_| json!(key)),
        BaseType::Number => key
            .parse::<f64>()
            .ok()
            .and_then(|n| serde_json::Number::from_f64(n).map(Value::Number))
            .unwrap_or_else(|| json!(key)),
        _ => json!(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use serde_json::json;

    fn schema(types: Value) -> Schema {
        Schema::from_value(&json!({ "types": types })).unwrap()
    }

    #[test]
    fn test_binary() {
        let s = schema(json!([
            ["Mac", "Binary", ["/eui"], ""],
            ["Blob", "Binary", ["{2", "}4"], ""]
        ]));
        assert!(validate(&s, "Mac", &json!("00:11:22:33:44:55")).is_ok());
        assert!(validate(&s, "Mac", &json!("00:11")).is_err());
        assert!(validate(&s, "Blob", &json!("AQID")).is_ok());
        assert!(validate(&s, "Blob", &json!([1, 2])).is_ok());
        assert!(validate(&s, "Blob", &json!([1])).is_err());
        assert!(validate(&s, "Blob", &json!([1, 256])).is_err());
    }

    #[test]
    fn test_number_and_boolean() {
        let s = schema(json!([
            ["Ratio", "Number", ["y0", "z1"], ""],
            ["Free", "Number", ["z0"], ""],
            ["Flag", "Boolean", [], ""]
        ]));
        assert!(validate(&s, "Ratio", &json!(0.5)).is_ok());
        assert!(validate(&s, "Ratio", &json!(1.5)).is_err());
        assert!(validate(&s, "Free", &json!(1.0e12)).is_ok());
        assert!(validate(&s, "Flag", &json!(true)).is_ok());
        let err = validate(&s, "Flag", &json!("true")).unwrap_err();
        assert!(err.is(ValidationErrorKind::Shape));
    }

    #[test]
    fn test_string_length_and_pattern() {
        let s = schema(json!([
            ["Code", "String", ["%[A-Z]{3}"], ""],
            ["Short", "String", ["{1", "}3"], ""],
            ["Any", "String", [], ""]
        ]));
        assert!(validate(&s, "Code", &json!("ABC")).is_ok());
        assert!(validate(&s, "Code", &json!("ABCD")).is_err());
        assert!(validate(&s, "Short", &json!("")).is_err());
        assert!(validate(&s, "Short", &json!("abcd")).is_err());
        assert!(validate(&s, "Any", &json!("x".repeat(255))).is_ok());
        assert!(validate(&s, "Any", &json!("x".repeat(256))).is_err());
    }

    #[test]
    fn test_enumerated_by_value_and_id() {
        let s = schema(json!([
            ["Action", "Enumerated", [], "", [[1, "scan", ""], [2, "deny", ""]]],
            ["Code", "Enumerated", ["="], "", [[1, "scan", ""], [2, "deny", ""]]]
        ]));
        assert!(validate(&s, "Action", &json!("deny")).is_ok());
        assert!(validate(&s, "Action", &json!(2)).is_ok());
        assert!(validate(&s, "Action", &json!("allow")).is_err());
        assert!(validate(&s, "Code", &json!(1)).is_ok());
        assert!(validate(&s, "Code", &json!("scan")).is_err());
    }

    #[test]
    fn test_array_positional() {
        let s = schema(json!([
            ["Pair", "Array", [], "", [
                [1, "name", "String", [], ""],
                [2, "count", "Integer", ["[0"], ""]
            ]],
            ["Net", "Array", ["/ipv4-net"], "", [
                [1, "addr", "Binary", ["/ipv4-addr"], ""],
                [2, "prefix", "Integer", ["[0"], ""]
            ]]
        ]));
        assert!(validate(&s, "Pair", &json!(["a", 1])).is_ok());
        assert!(validate(&s, "Pair", &json!(["a"])).is_ok());
        assert!(validate(&s, "Pair", &json!(["a", null])).is_ok());
        assert!(validate(&s, "Pair", &json!([null, 1])).is_err());
        assert!(validate(&s, "Pair", &json!(["a", 1, 2])).is_err());
        assert!(validate(&s, "Net", &json!("10.0.0.0/8")).is_ok());
        assert!(validate(&s, "Net", &json!(["10.0.0.0", 8])).is_ok());
        assert!(validate(&s, "Net", &json!("10.0.0/8")).is_err());
    }

    #[test]
    fn test_array_of_unique_and_counts() {
        let s = schema(json!([
            ["Names", "ArrayOf", ["*String", "{1", "q"], ""],
            ["Loose", "ArrayOf", [], ""]
        ]));
        assert!(validate(&s, "Names", &json!(["a", "b"])).is_ok());
        assert!(validate(&s, "Names", &json!([])).is_err());
        assert!(validate(&s, "Names", &json!(["a", "a"])).is_err());
        let err = validate(&s, "Names", &json!(["a", 1])).unwrap_err();
        assert_eq!(err.path, vec!["Names".to_string(), "1".to_string()]);
        let err = validate(&s, "Loose", &json!([])).unwrap_err();
        assert!(err.is(ValidationErrorKind::Constraint));
        assert!(err.message.contains("vtype"));
    }

    #[test]
    fn test_map_of_numeric_keys() {
        let s = schema(json!([
            ["Ports", "MapOf", ["+Integer", "*String"], ""],
            ["Broken", "MapOf", ["+Missing", "*String"], ""]
        ]));
        assert!(validate(&s, "Ports", &json!({"80": "http", "443": "https"})).is_ok());
        assert!(validate(&s, "Ports", &json!([80, "http"])).is_ok());
        assert!(validate(&s, "Ports", &json!({"http": "80"})).is_err());
        let err = validate(&s, "Broken", &json!({})).unwrap_err();
        assert!(err.is(ValidationErrorKind::Constraint));
        assert_eq!(err.type_name.as_deref(), Some("Broken"));
    }

    #[test]
    fn test_map_unknown_and_extend() {
        let s = schema(json!([
            ["Closed", "Map", [], "", [[1, "a", "String", ["[0"], ""]]],
            ["Open", "Map", ["X"], "", [[1, "a", "String", ["[0"], ""]]]
        ]));
        assert!(validate(&s, "Closed", &json!({"b": 1})).is_err());
        assert!(validate(&s, "Open", &json!({"b": 1})).is_ok());
    }

    #[test]
    fn test_array_of_unique_objects_ignore_key_order() {
        let s = schema(json!([
            ["Pts", "ArrayOf", ["*Pt", "q"], ""],
            ["Pt", "Map", [], "", [
                [1, "a", "Integer", ["[0"], ""],
                [2, "b", "Integer", ["[0"], ""]
            ]]
        ]));
        assert!(validate(&s, "Pts", &json!([{"a": 1, "b": 2}, {"a": 2, "b": 1}])).is_ok());
        let err = validate(&s, "Pts", &json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}])).unwrap_err();
        assert!(err.is(ValidationErrorKind::Constraint));
        assert!(err.message.contains("duplicate"));
    }

    #[test]
    fn test_map_field_by_name_and_id() {
        let s = schema(json!([
            ["Msg", "Map", [], "", [[1, "count", "Integer", ["{0", "}10"], ""]]]
        ]));
        assert!(validate(&s, "Msg", &json!({"count": 5})).is_ok());
        assert!(validate(&s, "Msg", &json!({"1": 5})).is_ok());
        let err = validate(&s, "Msg", &json!({"count": 9999, "1": 5})).unwrap_err();
        assert!(err.is(ValidationErrorKind::Shape));
        assert_eq!(err.field.as_deref(), Some("1"));
    }

    #[test]
    fn test_repeated_field() {
        let s = schema(json!([
            ["Bag", "Record", [], "", [
                [1, "tags", "String", ["[1", "]3"], ""],
                [2, "notes", "String", ["[0", "]0"], ""]
            ]]
        ]));
        assert!(validate(&s, "Bag", &json!({"tags": ["a"]})).is_ok());
        assert!(validate(&s, "Bag", &json!({"tags": ["a", "b", "c", "d"]})).is_err());
        assert!(validate(&s, "Bag", &json!({"tags": "a"})).is_err());
        assert!(validate(&s, "Bag", &json!({"tags": ["a"], "notes": ["n", "n"]})).is_ok());
    }

    #[test]
    fn test_recursion_limit() {
        let s = Schema::with_limits(
            Default::default(),
            vec![crate::definitions::TypeDefinition::from_value(&json!(
                ["Node", "Map", [], "", [[1, "next", "Node", ["[0"], ""]]]
            ))
            .unwrap()],
            crate::limits::Limits::default().with_max_depth(4),
        )
        .unwrap();
        let mut value = json!({});
        for _ in 0..10 {
            value = json!({ "next": value });
        }
        let err = validate(&s, "Node", &value).unwrap_err();
        assert!(err.is(ValidationErrorKind::RecursionLimitExceeded));
    }

    #[test]
    fn test_unknown_type() {
        let s = schema(json!([]));
        let err = validate(&s, "Nope", &json!(1)).unwrap_err();
        assert!(err.is(ValidationErrorKind::UnknownType));
        assert!(validate(&s, "String", &json!("primitive")).is_ok());
    }
}
