//! Types and result structures for build environment

/// Result of executing a build command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommandResult {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    /// Interleaved stdout and stderr; empty when output was inherited
    pub output: String,
}

impl BuildCommandResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
