//! JADN schema
//!
//! A [`Schema`] is the `info` metadata plus the ordered type definitions.
//! Building one checks the definitions against each other and precomputes
//! everything validation needs:
//!
//! - derived enumerations (`#Type` references, and Enumerated types
//!   carrying the `#` or `>` option),
//! - field types with their field-level type options merged over the
//!   referenced type,
//! - compiled `%pattern` regular expressions.
//!
//! After construction a schema is immutable.

mod info;

pub use info::{
    Config, Info, DEFAULT_MAX_BINARY, DEFAULT_MAX_ELEMENTS, DEFAULT_MAX_STRING, DEFAULT_SYS,
};

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::definitions::{
    derive_enumerated, BaseType, EnumItem, Field, Kind, TypeDefinition,
};
use crate::error::{Error, ParseError, Result, ValidationError};
use crate::limits::Limits;
use crate::names::{is_qualified, matches_pattern, split_qualified};
use crate::options::strip_derived;
use crate::validators::{self, formats};

/// A built JADN schema
#[derive(Debug, Clone)]
pub struct Schema {
    info: Info,
    types: IndexMap<String, TypeDefinition>,
    limits: Limits,
    builtins: HashMap<String, TypeDefinition>,
    extensions: HashMap<String, TypeDefinition>,
    field_types: HashMap<(String, String), TypeDefinition>,
    patterns: HashMap<String, Regex>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info && self.types == other.types
    }
}

impl Schema {
    /// Build a schema from metadata and definitions
    pub fn new(info: Info, types: Vec<TypeDefinition>) -> Result<Self> {
        Self::build(info, types, Limits::default())
    }

    /// Build a schema under explicit resource limits
    pub fn with_limits(info: Info, types: Vec<TypeDefinition>, limits: Limits) -> Result<Self> {
        Self::build(info, types, limits)
    }

    /// Build a schema from its array form (`{"info": ..., "types": [...]}`)
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::new("Schema must be an object with 'types'"))?;

        let info = match obj.get("info") {
            Some(info) => serde_json::from_value(info.clone()).map_err(|e| {
                ParseError::new("Invalid schema info")
                    .with_location("info")
                    .with_source(e.to_string())
            })?,
            None => Info::default(),
        };

        let entries = obj
            .get("types")
            .and_then(Value::as_array)
            .ok_or_else(|| ParseError::new("Schema 'types' must be an array"))?;
        let types = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                TypeDefinition::from_value(entry).map_err(|e| {
                    let location = match &e.location {
                        Some(inner) => format!("types[{}] ({})", i, inner),
                        None => format!("types[{}]", i),
                    };
                    e.with_location(location)
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(info, types)
    }

    /// Build a schema from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    fn build(info: Info, definitions: Vec<TypeDefinition>, limits: Limits) -> Result<Self> {
        limits.check_types(definitions.len())?;

        let mut types = IndexMap::with_capacity(definitions.len());
        for def in definitions {
            if types.contains_key(def.name()) {
                return Err(ParseError::new(format!("Duplicate type name '{}'", def.name())).into());
            }
            types.insert(def.name().to_string(), def);
        }

        for export in &info.exports {
            if !types.contains_key(export) {
                return Err(ParseError::new(format!("Exported type '{}' is not defined", export))
                    .with_location("info.exports")
                    .into());
            }
        }

        let builtins = BaseType::ALL
            .into_iter()
            .filter(|b| !b.has_fields())
            .map(|b| {
                let def = TypeDefinition::primitive(b, b.as_str(), Default::default());
                (b.as_str().to_string(), def)
            })
            .collect();

        let mut schema = Self {
            info,
            types,
            limits,
            builtins,
            extensions: HashMap::new(),
            field_types: HashMap::new(),
            patterns: HashMap::new(),
        };
        schema.extensions = schema.unfold_derived()?;
        schema.field_types = schema.merge_field_options();
        schema.patterns = schema.compile_patterns()?;

        debug!(
            package = %schema.info.package,
            types = schema.types.len(),
            extensions = schema.extensions.len(),
            field_types = schema.field_types.len(),
            patterns = schema.patterns.len(),
            "built schema"
        );
        Ok(schema)
    }

    fn compile_patterns(&self) -> Result<HashMap<String, Regex>> {
        let mut patterns = HashMap::new();
        for def in self.types.values().chain(self.field_types.values()) {
            let Some(pattern) = &def.options().pattern else {
                continue;
            };
            if patterns.contains_key(pattern) {
                continue;
            }
            let re = formats::compile_pattern(pattern).map_err(|e| {
                ParseError::new(format!("Invalid pattern '{}'", pattern))
                    .with_location(def.name().to_string())
                    .with_source(e.to_string())
            })?;
            patterns.insert(pattern.clone(), re);
        }
        Ok(patterns)
    }

    /// Compiled regex of a `%pattern` option used in this schema
    pub(crate) fn pattern(&self, pattern: &str) -> Option<&Regex> {
        self.patterns.get(pattern)
    }

    fn unfold_derived(&self) -> Result<HashMap<String, TypeDefinition>> {
        let mut extensions = HashMap::new();

        for def in self.types.values() {
            if let Kind::Enumerated(_) = def.kind() {
                let opts = def.options();
                let items = if let Some(source) = &opts.enumeration {
                    self.types
                        .get(strip_derived(source).1)
                        .map(|src| derive_enumerated(src).map(|d| d.items().to_vec()))
                        .transpose()?
                } else if let Some(source) = &opts.pointer {
                    self.types.get(source.as_str()).map(|src| self.pointer_items(src))
                } else {
                    None
                };
                if let Some(items) = items {
                    let unfolded = TypeDefinition::new(
                        def.name(),
                        Kind::Enumerated(items),
                        opts.clone(),
                        def.description(),
                    )?;
                    extensions.insert(def.name().to_string(), unfolded);
                }
            }

            for reference in derived_references(def) {
                let source = &reference[1..];
                if extensions.contains_key(reference) {
                    continue;
                }
                if let Some(src) = self.types.get(source) {
                    extensions.insert(reference.to_string(), derive_enumerated(src)?);
                }
            }
        }

        Ok(extensions)
    }

    /// Field paths of `source`, descending into fields marked with `<`
    fn pointer_items(&self, source: &TypeDefinition) -> Vec<EnumItem> {
        fn walk(
            schema: &Schema,
            def: &TypeDefinition,
            prefix: &str,
            visited: &mut HashSet<String>,
            items: &mut Vec<EnumItem>,
        ) {
            if !visited.insert(def.name().to_string()) {
                return;
            }
            for field in def.fields() {
                let path = format!("{}{}", prefix, field.name);
                let nested = schema
                    .types
                    .get(field.type_ref.as_str())
                    .filter(|t| field.options.dir && t.has_fields() && !t.is_enum());
                match nested {
                    Some(t) => walk(schema, t, &format!("{}/", path), visited, items),
                    None => {
                        let id = items.len() as i64 + 1;
                        items.push(EnumItem::new(id, path, field.description.clone()));
                    }
                }
            }
            visited.remove(def.name());
        }

        let mut items = Vec::new();
        walk(self, source, "", &mut HashSet::new(), &mut items);
        items
    }

    fn merge_field_options(&self) -> HashMap<(String, String), TypeDefinition> {
        let mut merged = HashMap::new();
        for def in self.types.values() {
            for field in def.fields() {
                if !field.options.has_type_options() {
                    continue;
                }
                if let Some(base) = self.lookup(&field.type_ref) {
                    let overlay = field.options.type_options();
                    merged.insert(
                        (def.name().to_string(), field.name.clone()),
                        base.with_merged_options(base.name(), &overlay),
                    );
                }
            }
        }
        merged
    }

    /// Schema metadata
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Resource limits in force
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Schema `config` with defaults
    pub fn config(&self) -> &Config {
        &self.info.config
    }

    /// Type definitions in schema order
    pub fn types(&self) -> &IndexMap<String, TypeDefinition> {
        &self.types
    }

    /// Look up a definition declared in the schema
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Resolve a type reference to the definition validation uses
    ///
    /// Derived enumerations (`#Type` and unfolded `#`/`>` Enumerated types)
    /// shadow declared types; base type names resolve to anonymous
    /// definitions of that base type.
    pub fn lookup(&self, reference: &str) -> Option<&TypeDefinition> {
        self.extensions
            .get(reference)
            .or_else(|| self.types.get(reference))
            .or_else(|| self.builtins.get(reference))
    }

    /// Resolve the type of a field of `owner`, field-level type options applied
    pub fn field_type(&self, owner: &str, field: &Field) -> Option<&TypeDefinition> {
        self.field_types
            .get(&(owner.to_string(), field.name.clone()))
            .or_else(|| self.lookup(&field.type_ref))
    }

    pub(crate) fn extensions(&self) -> &HashMap<String, TypeDefinition> {
        &self.extensions
    }

    /// The canonical array form
    pub fn schema(&self) -> Value {
        let mut obj = Map::new();
        if !self.info.is_empty() {
            obj.insert(
                "info".to_string(),
                serde_json::to_value(&self.info).unwrap_or(Value::Null),
            );
        }
        obj.insert(
            "types".to_string(),
            Value::Array(self.types.values().map(TypeDefinition::schema).collect()),
        );
        Value::Object(obj)
    }

    /// References that do not resolve to a primitive or a declared type
    ///
    /// Qualified references are reported only when their prefix is not
    /// declared in `info.namespaces`.
    pub fn check_references(&self) -> Vec<String> {
        let mut unresolved: Vec<String> = Vec::new();
        for def in self.types.values() {
            for reference in def.references() {
                let known = if is_qualified(reference) {
                    let (prefix, _) = split_qualified(reference);
                    prefix.and_then(|p| self.info.namespaces.get_package(p)).is_some()
                } else {
                    self.types.contains_key(reference) || self.builtins.contains_key(reference)
                };
                if !known && !unresolved.iter().any(|u| u == reference) {
                    unresolved.push(reference.to_string());
                }
            }
        }
        unresolved
    }

    /// Check type, field and namespace names against the `config` patterns
    pub fn check_names(&self) -> Result<()> {
        let config = self.config();
        for def in self.types.values() {
            if !matches_pattern(config.type_name(), def.name())? {
                return Err(ParseError::new(format!("Invalid type name '{}'", def.name()))
                    .with_source(config.type_name().to_string())
                    .into());
            }
            if def.is_enum() {
                continue;
            }
            for field in def.fields() {
                if !matches_pattern(config.field_name(), &field.name)? {
                    return Err(ParseError::new(format!(
                        "Invalid field name '{}.{}'",
                        def.name(),
                        field.name
                    ))
                    .with_source(config.field_name().to_string())
                    .into());
                }
            }
        }
        for (prefix, _) in self.info.namespaces.iter() {
            if !matches_pattern(config.nsid(), prefix)? {
                return Err(ParseError::new(format!("Invalid namespace prefix '{}'", prefix))
                    .with_source(config.nsid().to_string())
                    .into());
            }
        }
        Ok(())
    }

    /// Validate an instance against a named type
    pub fn validate_as(&self, type_name: &str, instance: &Value) -> std::result::Result<(), ValidationError> {
        validators::validate(self, type_name, instance)
    }

    /// Check whether an instance is valid for a named type
    pub fn is_valid(&self, type_name: &str, instance: &Value) -> bool {
        self.validate_as(type_name, instance).is_ok()
    }

    /// Convert a compact instance of a named type to its verbose form
    pub fn expand(&self, type_name: &str, instance: &Value) -> std::result::Result<Value, ValidationError> {
        let def = self
            .lookup(type_name)
            .ok_or_else(|| ValidationError::unknown_type(type_name))?;
        Ok(def.expand(self, instance))
    }

    /// Derive the `Enum-<Name>` enumeration of a declared type
    pub fn derive_enumerated(&self, name: &str) -> Result<TypeDefinition> {
        let def = self
            .get(name)
            .ok_or_else(|| Error::Type(format!("type '{}' is not defined", name)))?;
        derive_enumerated(def)
    }
}

/// `#Type` references of a definition and its fields
fn derived_references(def: &TypeDefinition) -> Vec<&str> {
    let opts = def.options();
    let mut refs: Vec<&str> = [&opts.vtype, &opts.ktype]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();
    for field in def.fields() {
        refs.push(field.type_ref.as_str());
        refs.extend(
            [&field.options.vtype, &field.options.ktype]
                .into_iter()
                .flatten()
                .map(String::as_str),
        );
    }
    refs.retain(|r| strip_derived(r).0);
    refs
}

/// A schema available to the import resolver under its package id
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaPackage {
    /// Package identifier the schema is published under
    pub package: String,
    /// The package's schema
    pub schema: Schema,
}

impl SchemaPackage {
    /// Pair a schema with an explicit package id
    pub fn new(package: impl Into<String>, schema: Schema) -> Self {
        Self {
            package: package.into(),
            schema,
        }
    }

    /// Use the schema's own `info.package` as its id
    pub fn from_schema(schema: Schema) -> Self {
        Self {
            package: schema.info().package.clone(),
            schema,
        }
    }
}
