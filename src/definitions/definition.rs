//! Type definitions
//!
//! A [`TypeDefinition`] is one entry of a schema's `types` list,
//! `[name, base_type, options, description, fields?]`, turned into a typed
//! value. Kind-specific data lives in [`Kind`]; everything else is common.

use std::collections::HashSet;

use serde_json::{json, Value};

use super::base::BaseType;
use super::fields::{EnumItem, Field};
use crate::error::{Error, ParseError, Result};
use crate::options::{strip_derived, Options};

/// Kind-specific part of a definition
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
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
    Enumerated(Vec<EnumItem>),
    /// One of the listed alternatives
    Choice(Vec<Field>),
    /// Positional fields
    Array(Vec<Field>),
    /// Values of `vtype`
    ArrayOf,
    /// Named fields, unordered
    Map(Vec<Field>),
    /// `ktype` keys to `vtype` values
    MapOf,
    /// Named fields, ordered
    Record(Vec<Field>),
}

impl Kind {
    /// Base type tag of this kind
    pub fn base_type(&self) -> BaseType {
        match self {
            Kind::Binary => BaseType::Binary,
            Kind::Boolean => BaseType::Boolean,
            Kind::Integer => BaseType::Integer,
            Kind::Number => BaseType::Number,
            Kind::String => BaseType::String,
            Kind::Enumerated(_) => BaseType::Enumerated,
            Kind::Choice(_) => BaseType::Choice,
            Kind::Array(_) => BaseType::Array,
            Kind::ArrayOf => BaseType::ArrayOf,
            Kind::Map(_) => BaseType::Map,
            Kind::MapOf => BaseType::MapOf,
            Kind::Record(_) => BaseType::Record,
        }
    }

    /// Field-less kind for a base type
    ///
    /// Kinds with fields start out empty.
    pub fn empty(base: BaseType) -> Self {
        match base {
            BaseType::Binary => Kind::Binary,
            BaseType::Boolean => Kind::Boolean,
            BaseType::Integer => Kind::Integer,
            BaseType::Number => Kind::Number,
            BaseType::String => Kind::String,
            BaseType::Enumerated => Kind::Enumerated(Vec::new()),
            BaseType::Choice => Kind::Choice(Vec::new()),
            BaseType::Array => Kind::Array(Vec::new()),
            BaseType::ArrayOf => Kind::ArrayOf,
            BaseType::Map => Kind::Map(Vec::new()),
            BaseType::MapOf => Kind::MapOf,
            BaseType::Record => Kind::Record(Vec::new()),
        }
    }
}

/// A named, constraint-bearing JADN type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    name: String,
    options: Options,
    description: String,
    kind: Kind,
}

impl TypeDefinition {
    /// Create a definition, checking field id and name uniqueness
    pub fn new(
        name: impl Into<String>,
        kind: Kind,
        options: Options,
        description: impl Into<String>,
    ) -> std::result::Result<Self, ParseError> {
        let def = Self {
            name: name.into(),
            options,
            description: description.into(),
            kind,
        };
        def.check_members()?;
        Ok(def)
    }

    /// Create a definition of a field-less base type
    ///
    /// Used for primitives and for anonymous `ArrayOf`/`MapOf` field types.
    pub fn primitive(base: BaseType, name: impl Into<String>, options: Options) -> Self {
        debug_assert!(!base.has_fields());
        Self {
            name: name.into(),
            options,
            description: String::new(),
            kind: Kind::empty(base),
        }
    }

    /// Parse an array-form type entry
    pub fn from_value(value: &Value) -> std::result::Result<Self, ParseError> {
        let parts = value
            .as_array()
            .filter(|p| p.len() == 4 || p.len() == 5)
            .ok_or_else(|| {
                ParseError::new("Type must be [name, base_type, options, description, fields?]")
                    .with_source(value.to_string())
            })?;

        let name = parts[0]
            .as_str()
            .ok_or_else(|| ParseError::new("Type name must be a string"))?;
        let base: BaseType = parts[1]
            .as_str()
            .ok_or_else(|| ParseError::new("Base type must be a string"))?
            .parse()
            .map_err(|e: ParseError| e.with_location(name.to_string()))?;
        let options =
            Options::from_value(&parts[2]).map_err(|e| e.with_location(name.to_string()))?;
        let description = parts[3].as_str().ok_or_else(|| {
            ParseError::new("Type description must be a string").with_location(name.to_string())
        })?;

        let members: &[Value] = match parts.get(4) {
            Some(v) => v.as_array().map(Vec::as_slice).ok_or_else(|| {
                ParseError::new("Type fields must be an array").with_location(name.to_string())
            })?,
            None => &[],
        };

        if !base.has_fields() && !members.is_empty() {
            return Err(ParseError::new(format!("{} types cannot have fields", base))
                .with_location(name.to_string()));
        }

        let kind = match base {
            BaseType::Enumerated => Kind::Enumerated(
                members
                    .iter()
                    .map(EnumItem::from_value)
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| e.with_location(name.to_string()))?,
            ),
            BaseType::Choice | BaseType::Array | BaseType::Map | BaseType::Record => {
                let fields = members
                    .iter()
                    .map(Field::from_value)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| e.with_location(name.to_string()))?;
                match base {
                    BaseType::Choice => Kind::Choice(fields),
                    BaseType::Array => Kind::Array(fields),
                    BaseType::Map => Kind::Map(fields),
                    _ => Kind::Record(fields),
                }
            }
            other => Kind::empty(other),
        };

        Self::new(name, kind, options, description)
    }

    /// Format the definition as a JADN array entry
    pub fn schema(&self) -> Value {
        let mut entry = vec![
            json!(self.name),
            json!(self.base_type().as_str()),
            self.options.to_value(),
            json!(self.description),
        ];
        match &self.kind {
            Kind::Enumerated(items) if items.is_empty() && self.is_derived_enum() => {}
            Kind::Enumerated(items) => {
                entry.push(Value::Array(items.iter().map(EnumItem::to_value).collect()))
            }
            Kind::Choice(fields) | Kind::Array(fields) | Kind::Map(fields) | Kind::Record(fields) => {
                entry.push(Value::Array(fields.iter().map(Field::to_value).collect()))
            }
            _ => {}
        }
        Value::Array(entry)
    }

    /// The definition's schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The definition's description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The definition's options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The definition's kind
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The definition's base type
    pub fn base_type(&self) -> BaseType {
        self.kind.base_type()
    }

    /// Fields of Array, Choice, Map and Record definitions; empty otherwise
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            Kind::Choice(f) | Kind::Array(f) | Kind::Map(f) | Kind::Record(f) => f,
            _ => &[],
        }
    }

    /// Items of Enumerated definitions; empty otherwise
    pub fn items(&self) -> &[EnumItem] {
        match &self.kind {
            Kind::Enumerated(items) => items,
            _ => &[],
        }
    }

    /// Look up a field by name
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Look up a field by id
    pub fn field_by_id(&self, id: i64) -> Option<&Field> {
        self.fields().iter().find(|f| f.id == id)
    }

    /// Look up a field by a key that is either its name or its id
    ///
    /// With the `id` option set, keys are ids; otherwise names are tried
    /// first and integer-looking keys fall back to ids.
    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        let by_id = || key.parse::<i64>().ok().and_then(|id| self.field_by_id(id));
        if self.options.id {
            by_id()
        } else {
            self.field_by_name(key).or_else(by_id)
        }
    }

    /// Determine if the definition is an enumerated type
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, Kind::Enumerated(_))
    }

    /// Enumeration derived from another type (`#` or `>` option)
    pub fn is_derived_enum(&self) -> bool {
        self.is_enum() && (self.options.enumeration.is_some() || self.options.pointer.is_some())
    }

    /// Determine if the definition is a selector type (`Enumerated`, `Choice`)
    pub fn is_selector(&self) -> bool {
        self.base_type().is_selector()
    }

    /// Determine if the definition is a structure type
    /// (`Array`, `ArrayOf`, `Map`, `MapOf`, `Record`)
    pub fn is_structure(&self) -> bool {
        self.base_type().is_structure()
    }

    /// Determine if the definition is a primitive type
    pub fn is_primitive(&self) -> bool {
        self.base_type().is_primitive()
    }

    /// Determine if the definition has fields
    /// (`Enumerated`, `Choice`, `Array`, `Map`, `Record`)
    pub fn has_fields(&self) -> bool {
        self.base_type().has_fields()
    }

    /// Copy of this definition under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy of this definition with `overlay` merged over its options
    pub fn with_merged_options(&self, name: impl Into<String>, overlay: &Options) -> Self {
        Self {
            name: name.into(),
            options: self.options.merge(overlay),
            description: self.description.clone(),
            kind: self.kind.clone(),
        }
    }

    /// Copy of this definition with its options replaced
    pub fn with_options(&self, options: Options) -> Self {
        Self {
            options,
            ..self.clone()
        }
    }

    /// Copy of this definition with every member description replaced
    pub fn map_descriptions(&self, mut f: impl FnMut(&str) -> String) -> Self {
        let mut def = self.clone();
        def.description = f(&def.description);
        match &mut def.kind {
            Kind::Enumerated(items) => {
                for item in items {
                    item.description = f(&item.description);
                }
            }
            Kind::Choice(fields) | Kind::Array(fields) | Kind::Map(fields) | Kind::Record(fields) => {
                for field in fields {
                    field.description = f(&field.description);
                }
            }
            _ => {}
        }
        def
    }

    /// Every type reference made by this definition
    ///
    /// Field types, and `ktype`/`vtype`/`enum`/`pointer` options of the
    /// definition and of its fields. Derived-enumeration markers are
    /// stripped, so `*#Target` yields `Target`.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = self.options.references();
        for field in self.fields() {
            refs.push(field.type_ref.as_str());
            refs.extend(field.options.references());
        }
        refs
    }

    /// Copy of this definition with every type reference rewritten by `f`
    pub fn map_references<E>(
        &self,
        mut f: impl FnMut(&str) -> std::result::Result<String, E>,
    ) -> std::result::Result<Self, E> {
        let options = self.options.map_references(&mut f)?;
        let kind = match &self.kind {
            Kind::Choice(fields) => Kind::Choice(map_field_references(fields, &mut f)?),
            Kind::Array(fields) => Kind::Array(map_field_references(fields, &mut f)?),
            Kind::Map(fields) => Kind::Map(map_field_references(fields, &mut f)?),
            Kind::Record(fields) => Kind::Record(map_field_references(fields, &mut f)?),
            other => other.clone(),
        };
        Ok(Self {
            name: self.name.clone(),
            options,
            description: self.description.clone(),
            kind,
        })
    }

    /// Copy of this definition with every `#Type` reference replaced by `f(Type)`
    ///
    /// Covers field types and the `ktype`/`vtype` options of the definition
    /// and its fields.
    pub fn map_derived_references(&self, mut f: impl FnMut(&str) -> String) -> Self {
        let mut def = self.clone();
        rewrite_derived(&mut def.options.vtype, &mut f);
        rewrite_derived(&mut def.options.ktype, &mut f);
        if let Kind::Choice(fields) | Kind::Array(fields) | Kind::Map(fields) | Kind::Record(fields) =
            &mut def.kind
        {
            for field in fields {
                if let (true, name) = strip_derived(&field.type_ref) {
                    field.type_ref = f(name);
                }
                rewrite_derived(&mut field.options.vtype, &mut f);
                rewrite_derived(&mut field.options.ktype, &mut f);
            }
        }
        def
    }

    fn check_members(&self) -> std::result::Result<(), ParseError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let members: Vec<(i64, &str)> = match &self.kind {
            Kind::Enumerated(items) => items.iter().map(|i| (i.id, i.value.as_str())).collect(),
            _ => self.fields().iter().map(|f| (f.id, f.name.as_str())).collect(),
        };
        for (id, name) in members {
            if !ids.insert(id) {
                return Err(ParseError::new(format!("Duplicate field id {}", id))
                    .with_location(self.name.clone()));
            }
            if !names.insert(name) {
                return Err(ParseError::new(format!("Duplicate field name '{}'", name))
                    .with_location(self.name.clone()));
            }
        }
        Ok(())
    }
}

fn rewrite_derived(slot: &mut Option<String>, f: &mut impl FnMut(&str) -> String) {
    let replacement = match slot.as_deref().map(strip_derived) {
        Some((true, name)) => f(name),
        _ => return,
    };
    *slot = Some(replacement);
}

fn map_field_references<E>(
    fields: &[Field],
    f: &mut impl FnMut(&str) -> std::result::Result<String, E>,
) -> std::result::Result<Vec<Field>, E> {
    fields
        .iter()
        .map(|field| {
            let (derived, name) = strip_derived(&field.type_ref);
            let mapped = f(name)?;
            Ok(Field {
                type_ref: if derived { format!("#{}", mapped) } else { mapped },
                options: field.options.map_references(&mut *f)?,
                ..field.clone()
            })
        })
        .collect()
}

/// Convert a definition to an `Enumerated` definition of its field names
///
/// The derived type is named `Enum-<Name>` and carries over only the `id`
/// option. Enumerated definitions are returned unchanged; primitives and
/// field-less structures cannot be enumerated.
pub fn derive_enumerated(def: &TypeDefinition) -> Result<TypeDefinition> {
    match def.kind() {
        Kind::Enumerated(_) => Ok(def.clone()),
        Kind::Choice(fields) | Kind::Array(fields) | Kind::Map(fields) | Kind::Record(fields) => {
            let name = format!("Enum-{}", def.name());
            let items = fields
                .iter()
                .map(|f| EnumItem::new(f.id, f.name.clone(), f.description.clone()))
                .collect();
            let options = Options {
                id: def.options().id,
                ..Options::default()
            };
            Ok(TypeDefinition::new(
                name,
                Kind::Enumerated(items),
                options,
                format!("Derived Enumerated from {}", def.name()),
            )?)
        }
        _ => Err(Error::Type(format!(
            "{} cannot be extended as an enumerated type",
            def.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target() -> TypeDefinition {
        TypeDefinition::from_value(&json!(
            ["Target", "Choice", [], "", [
                [1, "device", "Device", [], ""],
                [2, "domain_name", "String", ["/hostname"], ""]
            ]]
        ))
        .unwrap()
    }

    #[test]
    fn test_from_value_and_schema() {
        let entry = json!(["Port", "Integer", ["{0", "}65535"], "Transport port"]);
        let def = TypeDefinition::from_value(&entry).unwrap();
        assert_eq!(def.name(), "Port");
        assert_eq!(def.base_type(), BaseType::Integer);
        assert_eq!(def.options().maxv, Some(65535));
        assert_eq!(def.schema(), entry);

        let def = target();
        assert_eq!(def.fields().len(), 2);
        assert!(def.is_selector());
        assert!(def.has_fields());
        assert!(!def.is_structure());
        assert_eq!(TypeDefinition::from_value(&def.schema()).unwrap(), def);
    }

    #[test]
    fn test_derived_enum_schema_has_no_items() {
        for entry in [
            json!(["Channel", "Enumerated", ["#Target"], ""]),
            json!(["Paths", "Enumerated", [">Target"], ""]),
        ] {
            let def = TypeDefinition::from_value(&entry).unwrap();
            assert!(def.is_derived_enum());
            assert_eq!(def.schema(), entry);
        }
        assert!(!target().is_derived_enum());
    }

    #[test]
    fn test_from_value_errors() {
        assert!(TypeDefinition::from_value(&json!(["A", "Null", [], ""])).is_err());
        assert!(TypeDefinition::from_value(&json!(["A", "String", [], ""," extra"])).is_err());
        assert!(
            TypeDefinition::from_value(&json!(["A", "String", [], "", [[1, "x", ""]]])).is_err()
        );
        let dup = json!(["R", "Record", [], "", [
            [1, "a", "String", [], ""],
            [1, "b", "String", [], ""]
        ]]);
        assert!(TypeDefinition::from_value(&dup).is_err());
    }

    #[test]
    fn test_field_lookup() {
        let def = target();
        assert_eq!(def.field_by_key("device").map(|f| f.id), Some(1));
        assert_eq!(def.field_by_key("2").map(|f| f.name.as_str()), Some("domain_name"));
        assert!(def.field_by_key("3").is_none());
    }

    #[test]
    fn test_references_and_rewrite() {
        let def = TypeDefinition::from_value(&json!(
            ["Pairs", "MapOf", ["+ns:Action", "*#ns:Target"], ""]
        ))
        .unwrap();
        assert_eq!(def.references(), vec!["ns:Target", "ns:Action"]);

        let rewritten = def
            .map_references::<()>(|r| Ok(r.replace("ns:", "")))
            .unwrap();
        assert_eq!(rewritten.options().ktype.as_deref(), Some("Action"));
        assert_eq!(rewritten.options().vtype.as_deref(), Some("#Target"));

        let target = target().map_references::<()>(|r| Ok(format!("x{}", r))).unwrap();
        assert_eq!(target.fields()[0].type_ref, "xDevice");
    }

    #[test]
    fn test_derive_enumerated() {
        let derived = derive_enumerated(&target()).unwrap();
        assert_eq!(derived.name(), "Enum-Target");
        assert!(derived.is_enum());
        assert_eq!(
            derived.items(),
            &[
                EnumItem::new(1, "device", ""),
                EnumItem::new(2, "domain_name", "")
            ]
        );
        assert_eq!(derive_enumerated(&derived).unwrap(), derived);

        let port = TypeDefinition::primitive(BaseType::Integer, "Port", Options::default());
        assert!(matches!(derive_enumerated(&port), Err(Error::Type(_))));
    }
}
