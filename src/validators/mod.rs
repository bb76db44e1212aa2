//! JADN instance validators
//!
//! This module contains the validation logic for instances:
//! - Recursive per-kind checks against a schema
//! - Semantic format validators

pub mod formats;
pub mod instance;

// Re-exports
pub use instance::{validate, Validator};
