//! Limits and constraints for JADN processing
//!
//! This module defines various limits to prevent resource exhaustion when
//! validating untrusted instances (deeply self-referential documents,
//! oversized collections) or resolving large package graphs.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum instance nesting depth during validation
    pub max_depth: usize,

    /// Hard cap on elements in any collection, regardless of schema config
    pub max_collection_size: usize,

    /// Maximum number of type definitions in a schema
    pub max_types: usize,

    /// Maximum number of packages visited during import resolution
    pub max_packages: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_collection_size: 100_000,
            max_types: 10_000,
            max_packages: 100,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 32,
            max_collection_size: 10_000,
            max_types: 1_000,
            max_packages: 20,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 1024,
            max_collection_size: 10_000_000,
            max_types: 1_000_000,
            max_packages: 10_000,
        }
    }

    /// Set the maximum validation depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check if a validation depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "Validation depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a collection size is within limits
    pub fn check_collection_size(&self, size: usize) -> Result<()> {
        if size > self.max_collection_size {
            Err(Error::LimitExceeded(format!(
                "Collection size {} exceeds maximum {}",
                size, self.max_collection_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of type definitions is within limits
    pub fn check_types(&self, count: usize) -> Result<()> {
        if count > self.max_types {
            Err(Error::LimitExceeded(format!(
                "Type definition count {} exceeds maximum {}",
                count, self.max_types
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of packages is within limits
    pub fn check_packages(&self, count: usize) -> Result<()> {
        if count > self.max_packages {
            Err(Error::LimitExceeded(format!(
                "Package count {} exceeds maximum {}",
                count, self.max_packages
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 128);
        assert!(limits.check_depth(100).is_ok());
        assert!(limits.check_depth(129).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_depth < Limits::default().max_depth);
        assert!(limits.check_depth(33).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_depth > Limits::default().max_depth);
        assert!(limits.check_depth(500).is_ok());
    }

    #[test]
    fn test_with_max_depth() {
        let limits = Limits::new().with_max_depth(4);
        assert!(limits.check_depth(4).is_ok());
        assert!(matches!(limits.check_depth(5), Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_check_collection_size_and_types() {
        let limits = Limits::default();
        assert!(limits.check_collection_size(1024).is_ok());
        assert!(limits.check_collection_size(200_000).is_err());
        assert!(limits.check_types(10).is_ok());
        assert!(limits.check_types(20_000).is_err());
        assert!(limits.check_packages(101).is_err());
    }
}
