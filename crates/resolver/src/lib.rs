#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency resolution for cellar
//!
//! Expands a package's declared dependencies into their transitive closure
//! and flattens it into an order where every package comes after the
//! packages it depends on. Foreign-ecosystem dependencies are not part of the
//! graph.

mod graph;
mod lookup;

pub use graph::{DependencyNode, DependencyResolver};
pub use lookup::{MemoryLookup, PackageLookup};
