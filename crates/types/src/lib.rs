#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the cellar build engine
//!
//! This crate holds the immutable package model the rest of the workspace
//! works from: resolved package specs, source locators, checksums, dependency
//! edges, patch declarations and compiler incompatibility annotations.

pub mod compiler;
pub mod dependency;
pub mod package;
pub mod patch;
pub mod source;
pub mod version;

pub use compiler::{Compiler, CompilerIncompatibility};
pub use dependency::{DepKind, Dependency, Ecosystem, PackageRef};
pub use package::{
    Bottle, DevelDeclaration, Keg, KegOnlyReason, PackageDefinition, PackageSpec, SkipClean,
    SourceDeclaration,
};
pub use patch::{PatchDeclaration, PatchSource, StripLevel};
pub use source::{Checksum, ChecksumType, SoftwareSpec, SpecRequest, SpecVariant};
pub use version::{ToolchainVersion, Version};
