//! Build environment management
//!
//! The environment is the explicit context every build subprocess runs in:
//! working directory, environment variable overrides, verbosity and the
//! active compiler. Nothing here touches the engine's own process state.

mod core;
mod execution;
mod types;

pub use self::core::BuildEnvironment;
pub use types::BuildCommandResult;
pub use execution::SCRUBBED_FOR_XCODEBUILD;
