//! # jadnschema
//!
//! A Rust implementation of JADN (JSON Abstract Data Notation) schemas.
//!
//! JADN describes message types independently of their serialization. A
//! schema is a list of named type definitions built from twelve base
//! types; this crate builds the type system from a schema's array form,
//! validates instances against any of its types and merges namespace
//! imports from other packages into a single schema.
//!
//! ## Features
//!
//! - Compact option strings parsed into typed constraints
//! - Instance validation with typed, path-carrying errors
//! - Compact (field id) to verbose (field name) instance expansion
//! - Derived enumerations (`#Type`, `>Type`)
//! - Import resolution across packages with collision handling
//! - Resource limits for untrusted instances
//!
//! ## Example
//!
//! ```rust
//! use jadnschema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "types": [
//!         ["IPv4-Connection", "Record", [], "", [
//!             [1, "src_addr", "String", ["/ipv4", "[0"], ""],
//!             [2, "src_port", "Port", ["[0"], ""]
//!         ]],
//!         ["Port", "Integer", ["{0", "}65535"], ""]
//!     ]
//! }))?;
//!
//! assert!(schema.is_valid("IPv4-Connection", &json!({"src_port": 443})));
//! assert!(!schema.is_valid("IPv4-Connection", &json!({"src_port": 65539})));
//! # Ok::<(), jadnschema::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and references
pub mod names;
pub mod namespaces;

// Type system
pub mod options;
pub mod definitions;
pub mod schema;

// Instance validation
pub mod validators;

// Schema-to-schema transformations
pub mod transform;

// Re-exports for convenience
pub use definitions::{derive_enumerated, BaseType, EnumItem, Field, Kind, TypeDefinition};
pub use error::{Error, ParseError, ResolveError, Result, ValidationError, ValidationErrorKind};
pub use limits::Limits;
pub use options::Options;
pub use schema::{Config, Info, Schema, SchemaPackage};
pub use transform::resolve;
pub use validators::validate;

/// Version of the jadnschema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JADN meta-schema version implemented
pub const JADN_VERSION: &str = "1.0";
