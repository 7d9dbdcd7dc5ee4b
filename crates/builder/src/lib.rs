#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! Source builds for cellar
//!
//! This crate takes a resolved package from fetched source to an installed
//! keg: compiler selection, patching, running the package's build procedure
//! in a scoped environment and recovering from failures.

mod compiler;
mod context;
mod environment;
mod operator;
mod patch;
mod session;

pub use compiler::{resolve as resolve_compiler, CompilerDecision, HostToolchain};
pub use context::BuildContext;
pub use environment::{BuildCommandResult, BuildEnvironment, SCRUBBED_FOR_XCODEBUILD};
pub use operator::{InteractiveShell, OperatorSession};
pub use patch::{Compression, PatchEngine, PatchJob, PatchKind, PatchPlan, PREFIX_PLACEHOLDER};
pub use session::{BrewOutcome, Brewer, BuildProcedure, BuildSession};

pub use cellar_events::BuildState;
