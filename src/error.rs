//! Error types for jadnschema
//!
//! This module defines all error types used throughout the library:
//! schema building errors, instance validation errors and import
//! resolution errors, gathered under a single [`Error`] enum.

use std::fmt;
use thiserror::Error;

/// Result type alias using jadnschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jadnschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// Instance validation error
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Schema parsing/building error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Import resolution error
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Type error (operation not applicable to a definition kind)
    #[error("type error: {0}")]
    Type(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Reference to a type name absent from the schema
    UnknownType,
    /// A value violates a bound, format or cardinality rule
    Constraint,
    /// The instance's structural shape does not match the kind
    Shape,
    /// Instance nesting exceeded the configured maximum depth
    RecursionLimitExceeded,
}

impl ValidationErrorKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::UnknownType => "UnknownType",
            ValidationErrorKind::Constraint => "ConstraintError",
            ValidationErrorKind::Shape => "ShapeError",
            ValidationErrorKind::RecursionLimitExceeded => "RecursionLimitExceeded",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance validation error with context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Failure category
    pub kind: ValidationErrorKind,
    /// Error message
    pub message: String,
    /// Name of the type whose rule failed
    pub type_name: Option<String>,
    /// Field (or key) of that type involved in the failure
    pub field: Option<String>,
    /// Type/field segments from the validated root down to the failing node
    pub path: Vec<String>,
    /// Expected value or bound
    pub expected: Option<String>,
    /// Actual value found in the instance
    pub actual: Option<String>,
    /// Underlying reason
    pub reason: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            type_name: None,
            field: None,
            path: Vec::new(),
            expected: None,
            actual: None,
            reason: None,
        }
    }

    /// Reference to a type that is not defined
    pub fn unknown_type(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownType,
            format!("type '{}' is not defined in the schema", name),
        )
        .with_type_name(name)
    }

    /// Bound, format or cardinality violation in `type_name`
    pub fn constraint(type_name: &str, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::Constraint, message).with_type_name(type_name)
    }

    /// Structural mismatch in `type_name`
    pub fn shape(type_name: &str, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::Shape, message).with_type_name(type_name)
    }

    /// Nesting deeper than `max_depth`
    pub fn recursion_limit(type_name: &str, max_depth: usize) -> Self {
        Self::new(
            ValidationErrorKind::RecursionLimitExceeded,
            format!("maximum validation depth of {} exceeded", max_depth),
        )
        .with_type_name(type_name)
    }

    /// Set the failing type name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the failing field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the expected value
    pub fn with_expected(mut self, expected: impl ToString) -> Self {
        self.expected = Some(expected.to_string());
        self
    }

    /// Set the actual value
    pub fn with_actual(mut self, actual: impl ToString) -> Self {
        self.actual = Some(actual.to_string());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Prepend a path segment as the error propagates towards the root
    pub fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Path from the root as a `/`-separated string
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Check whether this error is of the given kind
    pub fn is(&self, kind: ValidationErrorKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if let Some(ref type_name) = self.type_name {
            write!(f, "\n\nType: {}", type_name)?;
            if let Some(ref field) = self.field {
                write!(f, ".{}", field)?;
            }
        }

        if let Some(ref expected) = self.expected {
            write!(f, "\n\nExpected: {}", expected)?;
        }

        if let Some(ref actual) = self.actual {
            write!(f, "\n\nActual: {}", actual)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        if !self.path.is_empty() {
            write!(f, "\n\nPath: {}", self.path_string())?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Schema parsing/building error
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the array form (e.g. `types[3].fields[1]`)
    pub location: Option<String>,
    /// Array-form source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Import resolution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The base schema declares no namespaces
    #[error("no references to resolve: the base schema declares no namespaces")]
    NoReferencesToResolve,

    /// A namespace prefix, package or type could not be located
    #[error("unresolved reference '{reference}' (via {})", .chain.join(" -> "))]
    UnresolvedReference {
        /// The qualified reference that failed
        reference: String,
        /// Definitions and references leading to it, root first
        chain: Vec<String>,
    },

    /// Two non-identical definitions compete for one name
    #[error("ambiguous collision: '{name}' from package '{package}' conflicts with an existing definition")]
    AmbiguousCollision {
        /// The contested type name
        name: String,
        /// Package the imported definition comes from
        package: String,
    },

    /// Too many packages visited
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The resolved schema could not be rebuilt
    #[error("resolved schema is invalid: {0}")]
    Schema(#[from] ParseError),
}
