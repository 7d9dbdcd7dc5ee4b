//! Resolving dependency references to packages

use cellar_errors::{Error, PackageError};
use cellar_types::{PackageRef, PackageSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// Source of package definitions for dependency expansion
pub trait PackageLookup: Send + Sync {
    /// Resolve a reference; embedded packages are returned as they are.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Unavailable` if no package has the referenced name.
    fn lookup(&self, reference: &PackageRef) -> Result<Arc<PackageSpec>, Error>;
}

/// Packages held in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemoryLookup {
    packages: HashMap<String, Arc<PackageSpec>>,
}

impl MemoryLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package, replacing any previous one with the same name
    pub fn insert(&mut self, spec: PackageSpec) -> Arc<PackageSpec> {
        let spec = Arc::new(spec);
        self.packages
            .insert(spec.name().to_string(), Arc::clone(&spec));
        spec
    }

    #[must_use]
    pub fn with_package(mut self, spec: PackageSpec) -> Self {
        self.insert(spec);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<PackageSpec>> {
        self.packages.get(name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageLookup for MemoryLookup {
    fn lookup(&self, reference: &PackageRef) -> Result<Arc<PackageSpec>, Error> {
        match reference {
            PackageRef::Embedded(spec) => Ok(Arc::clone(spec)),
            PackageRef::Name(name) => self.get(name).ok_or_else(|| {
                PackageError::Unavailable {
                    name: name.clone(),
                }
                .into()
            }),
        }
    }
}
