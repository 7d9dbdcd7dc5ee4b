//! Depth-first dependency expansion

use crate::PackageLookup;
use cellar_errors::{Error, PackageError};
use cellar_events::{AppEvent, EventEmitter, EventSender, ResolverEvent};
use cellar_types::PackageSpec;
use std::collections::HashSet;
use std::sync::Arc;

/// A dependency together with its own expanded dependencies
#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub spec: Arc<PackageSpec>,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    /// Post-order walk: children first, then this package
    fn flatten_into(&self, out: &mut Vec<Arc<PackageSpec>>) {
        for child in &self.children {
            child.flatten_into(out);
        }
        out.push(Arc::clone(&self.spec));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.spec.name()
    }
}

/// Expands dependency graphs through a `PackageLookup`
pub struct DependencyResolver {
    lookup: Arc<dyn PackageLookup>,
    event_sender: Option<EventSender>,
}

impl EventEmitter for DependencyResolver {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl DependencyResolver {
    #[must_use]
    pub fn new(lookup: Arc<dyn PackageLookup>) -> Self {
        Self {
            lookup,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    /// Expand every non-external dependency of `spec`, recursively.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Unavailable` for a dependency the lookup cannot
    /// resolve and `PackageError::CyclicDependency` if a package depends on
    /// itself through any chain.
    pub fn expand(&self, spec: &PackageSpec) -> Result<Vec<DependencyNode>, Error> {
        let mut path = vec![spec.name().to_string()];
        self.expand_within(spec, &mut path)
    }

    /// Transitive dependencies of `spec` in install order.
    ///
    /// Each package appears once, at its first post-order position, so every
    /// package follows its own dependencies. `spec` itself is not included.
    ///
    /// # Errors
    ///
    /// Same as [`DependencyResolver::expand`].
    pub fn recursive_deps(&self, spec: &PackageSpec) -> Result<Vec<Arc<PackageSpec>>, Error> {
        self.emit(AppEvent::Resolver(ResolverEvent::ExpansionStarted {
            package: spec.name().to_string(),
        }));

        let mut flattened = Vec::new();
        for node in self.expand(spec)? {
            node.flatten_into(&mut flattened);
        }

        let mut seen = HashSet::new();
        flattened.retain(|dep| seen.insert(dep.name().to_string()));

        self.emit(AppEvent::Resolver(ResolverEvent::ExpansionCompleted {
            package: spec.name().to_string(),
            dependencies: flattened.iter().map(|dep| dep.name().to_string()).collect(),
        }));
        Ok(flattened)
    }

    fn expand_within(
        &self,
        spec: &PackageSpec,
        path: &mut Vec<String>,
    ) -> Result<Vec<DependencyNode>, Error> {
        let mut nodes = Vec::new();
        for dependency in spec.dependencies() {
            let name = dependency.name();
            if let Some(start) = path.iter().position(|seen| seen == name) {
                let mut chain = path[start..].to_vec();
                chain.push(name.to_string());
                self.emit(AppEvent::Resolver(ResolverEvent::CycleDetected {
                    chain: chain.clone(),
                }));
                return Err(PackageError::CyclicDependency {
                    chain: chain.join(" -> "),
                }
                .into());
            }

            let resolved = self.lookup.lookup(&dependency.target)?;
            path.push(name.to_string());
            let children = self.expand_within(&resolved, path);
            path.pop();

            nodes.push(DependencyNode {
                spec: resolved,
                children: children?,
            });
        }
        Ok(nodes)
    }
}
