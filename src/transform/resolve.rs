//! Import resolution
//!
//! Copies every definition reached through a namespace-qualified reference
//! (`prefix:Name`) into the base schema, following references inside the
//! imported packages transitively, and rewrites the references to local
//! names. The result declares no namespaces and contains no qualified
//! references.
//!
//! Name collisions between definitions from different packages are
//! settled on the rewritten definitions, so two definitions are identical
//! only when the types they reference are identical too:
//! - identical definitions are kept once,
//! - otherwise the import is renamed `<Prefix>-<Name>`,
//! - a second collision on the renamed name is an error.
//!
//! A colliding import is rewritten under its renamed name first; it is
//! folded into the existing definition only if nothing imported meanwhile
//! refers to the renamed name.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::definitions::{BaseType, TypeDefinition};
use crate::error::{Error, ParseError, ResolveError};
use crate::limits::Limits;
use crate::names::{qualify, split_qualified};
use crate::schema::{Schema, SchemaPackage};

type Resolved<T> = std::result::Result<T, ResolveError>;

/// Resolve the qualified references of `base` against `packages`
pub fn resolve(base: &Schema, packages: &[SchemaPackage]) -> Resolved<Schema> {
    if base.info().namespaces.is_empty() {
        return Err(ResolveError::NoReferencesToResolve);
    }
    debug!(
        package = %base.info().package,
        namespaces = base.info().namespaces.len(),
        available = packages.len(),
        "resolving imports"
    );

    let mut resolver = Resolver::new(base, packages);
    let mut local = Vec::with_capacity(base.types().len());
    for def in base.types().values() {
        let chain = vec![def.name().to_string()];
        let rewritten = def.map_references(|r| resolver.base_reference(r, &chain))?;
        local.push(rewritten);
    }

    let imported: Vec<TypeDefinition> = resolver.imported.into_values().flatten().collect();
    debug!(imported = imported.len(), "resolved imports");

    let mut info = base.info().clone();
    info.namespaces.clear();
    local.extend(imported);
    Schema::with_limits(info, local, base.limits().clone()).map_err(|e| match e {
        Error::Parse(p) => ResolveError::Schema(p),
        other => ResolveError::Schema(ParseError::new(other.to_string())),
    })
}

struct Resolver<'a> {
    base: &'a Schema,
    packages: HashMap<&'a str, &'a Schema>,
    limits: &'a Limits,
    /// Local name of every imported `(package, name)`
    memo: HashMap<(String, String), String>,
    /// Imports in discovery order; `None` while references are rewritten
    imported: IndexMap<String, Option<TypeDefinition>>,
    visited_packages: HashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    fn new(base: &'a Schema, packages: &'a [SchemaPackage]) -> Self {
        Self {
            base,
            packages: packages
                .iter()
                .map(|p| (p.package.as_str(), &p.schema))
                .collect(),
            limits: base.limits(),
            memo: HashMap::new(),
            imported: IndexMap::new(),
            visited_packages: HashSet::new(),
        }
    }

    /// Rewrite a reference made by a base definition
    fn base_reference(&mut self, reference: &str, chain: &[String]) -> Resolved<String> {
        match split_qualified(reference) {
            (Some(prefix), name) => {
                let package = self.base.info().namespaces.get_package(prefix).ok_or_else(|| {
                    unresolved(reference, chain)
                })?;
                self.import(package, prefix, name, &extend(chain, reference))
            }
            (None, _) => Ok(reference.to_string()),
        }
    }

    /// Rewrite a reference made by a definition of an imported package
    fn package_reference(
        &mut self,
        package: &'a str,
        schema: &'a Schema,
        prefix: &str,
        reference: &str,
        chain: &[String],
    ) -> Resolved<String> {
        if BaseType::from_name(reference).is_some() {
            return Ok(reference.to_string());
        }
        match split_qualified(reference) {
            (Some(inner), name) => {
                let target = schema
                    .info()
                    .namespaces
                    .get_package(inner)
                    .ok_or_else(|| unresolved(reference, chain))?;
                self.import(target, inner, name, &extend(chain, reference))
            }
            (None, name) => self.import(package, prefix, name, &extend(chain, reference)),
        }
    }

    fn import(&mut self, package: &str, prefix: &str, name: &str, chain: &[String]) -> Resolved<String> {
        let key = (package.to_string(), name.to_string());
        if let Some(local) = self.memo.get(&key) {
            return Ok(local.clone());
        }

        let (package, schema) = self
            .packages
            .get_key_value(package)
            .map(|(p, s)| (*p, *s))
            .ok_or_else(|| unresolved(&qualify(prefix, name), chain))?;
        if self.visited_packages.insert(package) {
            self.limits
                .check_packages(self.visited_packages.len())
                .map_err(|e| ResolveError::LimitExceeded(e.to_string()))?;
        }
        let source = schema
            .get(name)
            .ok_or_else(|| unresolved(&qualify(prefix, name), chain))?;

        let collides = self.is_taken(name);
        let renamed = format!("{}-{}", capitalize(prefix), name);
        let provisional = if collides { renamed.clone() } else { name.to_string() };
        let fresh = !self.is_taken(&provisional);
        let start = self.imported.len();
        self.memo.insert(key.clone(), provisional.clone());
        if fresh {
            self.imported.insert(provisional.clone(), None);
        }

        let rewritten = source
            .map_references(|r| self.package_reference(package, schema, prefix, r, chain))?
            .renamed(provisional.as_str());

        if !collides {
            debug!(package, name, "importing definition");
            self.imported.insert(provisional.clone(), Some(rewritten));
            return Ok(provisional);
        }

        let referenced = self
            .imported
            .values()
            .skip(start)
            .flatten()
            .any(|def| def.references().contains(&provisional.as_str()));
        let local = if !referenced && self.is_identical(name, &rewritten) {
            name.to_string()
        } else if fresh {
            warn!(package, name, renamed = %renamed, "renaming colliding import");
            self.imported.insert(renamed.clone(), Some(rewritten));
            return Ok(renamed);
        } else if self.is_identical(&renamed, &rewritten) {
            renamed
        } else {
            return Err(ResolveError::AmbiguousCollision {
                name: name.to_string(),
                package: package.to_string(),
            });
        };

        debug!(package, name, local = %local, "import matches an existing definition");
        if fresh {
            self.imported.shift_remove(&provisional);
        }
        self.memo.insert(key, local.clone());
        Ok(local)
    }

    /// Name held by a base definition or an import
    fn is_taken(&self, name: &str) -> bool {
        self.base.types().contains_key(name) || self.imported.contains_key(name)
    }

    /// `candidate` equals the finished definition held under `local`
    fn is_identical(&self, local: &str, candidate: &TypeDefinition) -> bool {
        let existing = self
            .base
            .types()
            .get(local)
            .or_else(|| self.imported.get(local).and_then(Option::as_ref));
        match existing {
            Some(existing) => *existing == candidate.renamed(local),
            None => false,
        }
    }
}

fn unresolved(reference: &str, chain: &[String]) -> ResolveError {
    ResolveError::UnresolvedReference {
        reference: reference.to_string(),
        chain: chain.to_vec(),
    }
}

fn extend(chain: &[String], reference: &str) -> Vec<String> {
    let mut next = chain.to_vec();
    next.push(reference.to_string());
    next
}

fn capitalize(prefix: &str) -> String {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
