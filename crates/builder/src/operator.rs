//! Hand-off to a human after a failed debug build

use crate::BuildEnvironment;
use async_trait::async_trait;
use cellar_errors::{BuildError, Error};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Something that lets an operator inspect and fix a failed build in place
#[async_trait]
pub trait OperatorSession: Send + Sync {
    /// Run the session in `working_dir`, returning its exit status once it ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be started.
    async fn run(&self, working_dir: &Path, env: &BuildEnvironment) -> Result<Option<i32>, Error>;
}

/// Interactive shell attached to the terminal
#[derive(Debug, Clone)]
pub struct InteractiveShell {
    shell: String,
}

impl InteractiveShell {
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

#[async_trait]
impl OperatorSession for InteractiveShell {
    async fn run(&self, working_dir: &Path, env: &BuildEnvironment) -> Result<Option<i32>, Error> {
        let status = Command::new(&self.shell)
            .current_dir(working_dir)
            .envs(env.env_vars())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| BuildError::SpawnFailed {
                command: self.shell.clone(),
                message: e.to_string(),
            })?;
        Ok(status.code())
    }
}
