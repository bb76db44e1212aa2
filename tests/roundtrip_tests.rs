//! Round-trip properties of the schema and option codecs

use jadnschema::transform::{strip_comments, unfold_extensions};
use jadnschema::{Options, Schema};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

const OPENC2: &str = include_str!("schemas/openc2-subset.jadn");

fn openc2() -> Schema {
    Schema::from_json_str(OPENC2).expect("fixture schema should load")
}

#[test]
fn test_schema_round_trip_preserves_order() {
    let source: Value = serde_json::from_str(OPENC2).unwrap();
    let schema = openc2();

    let emitted = schema.schema();
    assert_eq!(emitted["types"], source["types"]);

    let names: Vec<&str> = schema.types().keys().map(String::as_str).collect();
    let source_names: Vec<&str> = source["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t[0].as_str().unwrap())
        .collect();
    assert_eq!(names, source_names);

    let reparsed = Schema::from_value(&emitted).unwrap();
    assert_eq!(reparsed, schema);
}

#[test]
fn test_fixture_is_consistent() {
    let schema = openc2();
    assert!(schema.check_references().is_empty());
    assert!(schema.check_names().is_ok());
    assert_eq!(schema.info().exports, vec!["OpenC2-Command", "OpenC2-Response"]);
}

#[test]
fn test_transforms_keep_schema_valid() {
    let schema = openc2();
    let command = json!({"action": "deny", "target": {"file": {"name": "a.exe"}}});

    let stripped = strip_comments(&schema, 0).unwrap();
    assert!(stripped.is_valid("OpenC2-Command", &command));
    assert_eq!(stripped.types().len(), schema.types().len());

    let unfolded = unfold_extensions(&schema).unwrap();
    assert!(unfolded.get("Enum-Target").is_some());
    assert_eq!(
        unfolded.get("Targets").unwrap().options().vtype.as_deref(),
        Some("Enum-Target")
    );
    let response = json!({"status": 200, "results": {"pairs": {"deny": ["file"]}}});
    assert!(unfolded.is_valid("OpenC2-Response", &response));
}

fn name() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9-]{0,8}"
}

fn options() -> impl Strategy<Value = Options> {
    (
        any::<bool>(),
        proptest::option::of(name()),
        proptest::option::of(name()),
        proptest::option::of("[a-z][a-z0-9-]{0,10}"),
        proptest::option::of(-1000i64..1000),
        proptest::option::of(-1000i64..1000),
        proptest::option::of(-1.0e6f64..1.0e6),
        (any::<bool>(), any::<bool>(), any::<bool>()),
        proptest::option::of(0i64..5),
        proptest::option::of(-1i64..10),
        proptest::option::of(0i64..100),
    )
        .prop_map(
            |(id, vtype, ktype, format, minv, maxv, minf, (unique, extend, dir), minc, maxc, tagid)| {
                Options {
                    id,
                    vtype,
                    ktype,
                    format,
                    minv,
                    maxv,
                    minf,
                    unique,
                    extend,
                    dir,
                    minc,
                    maxc,
                    tagid,
                    ..Options::default()
                }
            },
        )
}

/// Compact `OpenC2-Command` instances mixing id keys, names and positions
fn compact_command() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec![json!(1), json!(6), json!("allow"), json!("query")]),
        any::<bool>(),
        any::<bool>(),
        "[a-z]{1,8}",
    )
        .prop_map(|(action, id_keys, positional, host)| {
            let device = if id_keys {
                json!({"1": {"1": host}})
            } else {
                json!({"device": {"hostname": host}})
            };
            if positional {
                json!([action, device])
            } else if id_keys {
                json!({"1": action, "2": device})
            } else {
                json!({"action": action, "target": device})
            }
        })
}

proptest! {
    #[test]
    fn prop_options_round_trip(opts in options()) {
        let serialized = opts.serialize();
        let parsed = Options::parse(&serialized).unwrap();
        prop_assert_eq!(&parsed, &opts);
        prop_assert_eq!(parsed.serialize(), serialized);
    }

    #[test]
    fn prop_expand_is_idempotent(instance in compact_command()) {
        let schema = openc2();
        let once = schema.expand("OpenC2-Command", &instance).unwrap();
        let twice = schema.expand("OpenC2-Command", &once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert!(schema.is_valid("OpenC2-Command", &instance));
        prop_assert!(once.get("action").is_some());
    }
}
