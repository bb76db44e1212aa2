//! Schema transformations
//!
//! Functions that take a schema and produce another one:
//! - [`resolve`] merges namespace imports into a single schema
//! - [`strip_comments`] truncates or removes descriptions
//! - [`unfold_extensions`] replaces derived enumerations with explicit types

mod resolve;

pub use resolve::resolve;

use indexmap::IndexMap;
use tracing::debug;

use crate::definitions::TypeDefinition;
use crate::error::Result;
use crate::options::Options;
use crate::schema::Schema;

/// Truncate every description to `width` characters; `0` removes them
///
/// Truncated descriptions end in `..`.
pub fn strip_comments(schema: &Schema, width: usize) -> Result<Schema> {
    let trim = |text: &str| -> String {
        if width == 0 {
            String::new()
        } else if text.chars().count() <= width {
            text.to_string()
        } else {
            let kept: String = text.chars().take(width.saturating_sub(2)).collect();
            format!("{}..", kept)
        }
    };
    let types = schema
        .types()
        .values()
        .map(|def| def.map_descriptions(&trim))
        .collect();
    Schema::with_limits(schema.info().clone(), types, schema.limits().clone())
}

/// Replace derived enumerations with explicit `Enumerated` definitions
///
/// `#Type` references point to a new `Enum-Type` definition appended after
/// the existing types, and Enumerated types declared with the `#` or `>`
/// option get their items listed.
pub fn unfold_extensions(schema: &Schema) -> Result<Schema> {
    let mut added: IndexMap<String, TypeDefinition> = IndexMap::new();
    let mut types = Vec::with_capacity(schema.types().len());

    for def in schema.types().values() {
        let def = match schema.extensions().get(def.name()) {
            Some(unfolded) => unfolded.with_options(Options {
                enumeration: None,
                pointer: None,
                ..unfolded.options().clone()
            }),
            None => def.clone(),
        };
        let def = def.map_derived_references(|source| {
            match schema.extensions().get(&format!("#{}", source)) {
                Some(derived) => {
                    let name = derived.name().to_string();
                    if !schema.types().contains_key(&name) {
                        added.entry(name.clone()).or_insert_with(|| derived.clone());
                    }
                    name
                }
                None => format!("#{}", source),
            }
        });
        types.push(def);
    }

    debug!(added = added.len(), "unfolded derived enumerations");
    types.extend(added.into_values());
    Schema::with_limits(schema.info().clone(), types, schema.limits().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Schema {
        Schema::from_value(&json!({"types": [
            ["Command", "Record", [], "Command to perform an action on a target", [
                [1, "action", "#Target", [], "The task to perform"],
                [2, "target", "Target", [], ""]
            ]],
            ["Target", "Choice", [], "Thing acted on", [
                [1, "device", "String", [], ""],
                [2, "file", "String", [], ""]
            ]],
            ["Target-Kind", "Enumerated", ["#Target"], ""]
        ]}))
        .unwrap()
    }

    #[test]
    fn test_strip_comments() {
        let stripped = strip_comments(&sample(), 0).unwrap();
        for def in stripped.types().values() {
            assert_eq!(def.description(), "");
            assert!(def.fields().iter().all(|f| f.description.is_empty()));
        }

        let short = strip_comments(&sample(), 10).unwrap();
        let command = short.get("Command").unwrap();
        assert_eq!(command.description(), "Command ..");
        assert_eq!(command.fields()[0].description, "The task..");
        assert_eq!(short.get("Target").unwrap().description(), "Thing ac..");
    }

    #[test]
    fn test_unfold_extensions() {
        let unfolded = unfold_extensions(&sample()).unwrap();
        let names: Vec<_> = unfolded.types().keys().cloned().collect();
        assert_eq!(names, vec!["Command", "Target", "Target-Kind", "Enum-Target"]);

        let command = unfolded.get("Command").unwrap();
        assert_eq!(command.fields()[0].type_ref, "Enum-Target");

        let kind = unfolded.get("Target-Kind").unwrap();
        assert_eq!(kind.options().enumeration, None);
        assert_eq!(kind.items().len(), 2);

        assert!(unfolded.check_references().is_empty());
        assert!(unfolded.is_valid("Command", &json!({"action": "file", "target": {"file": "a"}})));
    }
}
