//! JADN type definitions
//!
//! This module contains the typed form of a schema's `types` entries:
//! - Base type tags
//! - Fields and enumeration items
//! - Type definitions and enumeration derivation
//! - Compact to verbose instance expansion

mod base;
mod definition;
mod expand;
mod fields;

pub use base::{
    is_primitive_name, BaseType, FIELD_TYPES, PRIMITIVE_TYPES, SELECTOR_TYPES, STRUCTURED_TYPES,
};
pub use definition::{derive_enumerated, Kind, TypeDefinition};
pub use fields::{EnumItem, Field};
