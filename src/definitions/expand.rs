//! Compact to verbose instance conversion
//!
//! Compact JADN instances identify fields by id (`{"1": ...}`), encode
//! Records positionally and Enumerated values by item id. Expansion rewrites
//! all of these to names, recursively. Types with the `id` option already
//! use ids as their verbose form and keep their keys.
//!
//! Expansion never fails: values it cannot map are copied unchanged and
//! left for validation to reject. Applying it twice gives the same result.
//! An object naming one field twice (`{"count": 1, "1": 2}`) is one of
//! those values.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::definition::{Kind, TypeDefinition};
use super::fields::Field;
use crate::schema::Schema;

impl TypeDefinition {
    /// Rewrite a compact instance of this type to verbose form
    pub fn expand(&self, schema: &Schema, value: &Value) -> Value {
        expand_node(schema, self, value, 0)
    }
}

fn expand_node(schema: &Schema, def: &TypeDefinition, value: &Value, depth: usize) -> Value {
    if depth > schema.limits().max_depth {
        return value.clone();
    }
    let by_id = def.options().id;

    match (def.kind(), value) {
        (Kind::Enumerated(items), Value::Number(n)) if !by_id => n
            .as_i64()
            .and_then(|id| items.iter().find(|item| item.id == id))
            .map(|item| Value::String(item.value.clone()))
            .unwrap_or_else(|| value.clone()),

        (Kind::Record(fields), Value::Array(values)) if !by_id && values.len() <= fields.len() => {
            let mut out = Map::new();
            for (field, v) in fields.iter().zip(values) {
                if !v.is_null() {
                    out.insert(field.name.clone(), expand_field(schema, def, field, v, depth));
                }
            }
            Value::Object(out)
        }

        (Kind::Choice(_) | Kind::Map(_) | Kind::Record(_), Value::Object(members))
            if !has_aliases(def, members) =>
        {
            let mut out = Map::new();
            for (key, v) in members {
                match def.field_by_key(key) {
                    Some(field) => {
                        let name = if by_id { key.clone() } else { field.name.clone() };
                        out.insert(name, expand_field(schema, def, field, v, depth));
                    }
                    None => {
                        out.insert(key.clone(), v.clone());
                    }
                }
            }
            Value::Object(out)
        }

        (Kind::Array(fields), Value::Array(values)) => Value::Array(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| match fields.get(i) {
                    Some(field) if !v.is_null() => expand_field(schema, def, field, v, depth),
                    _ => v.clone(),
                })
                .collect(),
        ),

        (Kind::ArrayOf, Value::Array(values)) => match value_type(schema, def) {
            Some(vtype) => Value::Array(
                values
                    .iter()
                    .map(|v| expand_node(schema, vtype, v, depth + 1))
                    .collect(),
            ),
            None => value.clone(),
        },

        (Kind::MapOf, Value::Object(members)) => match value_type(schema, def) {
            Some(vtype) => Value::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), expand_node(schema, vtype, v, depth + 1)))
                    .collect(),
            ),
            None => value.clone(),
        },

        _ => value.clone(),
    }
}

fn expand_field(
    schema: &Schema,
    owner: &TypeDefinition,
    field: &Field,
    value: &Value,
    depth: usize,
) -> Value {
    let Some(def) = schema.field_type(owner.name(), field) else {
        return value.clone();
    };
    match value {
        Value::Array(values) if field.is_repeated() => Value::Array(
            values
                .iter()
                .map(|v| expand_node(schema, def, v, depth + 1))
                .collect(),
        ),
        _ => expand_node(schema, def, value, depth + 1),
    }
}

/// Two keys naming the same field
fn has_aliases(def: &TypeDefinition, members: &Map<String, Value>) -> bool {
    let mut seen = HashSet::new();
    members
        .keys()
        .filter_map(|k| def.field_by_key(k))
        .any(|f| !seen.insert(f.id))
}

fn value_type<'a>(schema: &'a Schema, def: &TypeDefinition) -> Option<&'a TypeDefinition> {
    def.options().vtype.as_deref().and_then(|v| schema.lookup(v))
}
