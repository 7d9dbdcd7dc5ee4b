//! Command execution inside the build environment

use super::{core::BuildEnvironment, types::BuildCommandResult};
use cellar_errors::{BuildError, Error};
use cellar_events::{AppEvent, BuildEvent, EventEmitter, FailureContext};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::os::fd::OwnedFd;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;
use tokio::process::Command;

/// Compiler and flag variables removed while `xcodebuild` runs
pub const SCRUBBED_FOR_XCODEBUILD: &[&str] = &[
    "CC",
    "CXX",
    "LD",
    "CPP",
    "CFLAGS",
    "CXXFLAGS",
    "OBJCFLAGS",
    "OBJCXXFLAGS",
    "LDFLAGS",
    "CPPFLAGS",
];

const ELIDED_CONFIGURE_FLAG: &str = "--disable-dependency-tracking";

/// Removes a set of variables from the environment and puts them back on drop
pub(crate) struct ScrubbedEnv<'a> {
    env: &'a mut BuildEnvironment,
    saved: HashMap<String, String>,
}

impl<'a> ScrubbedEnv<'a> {
    pub(crate) fn new(env: &'a mut BuildEnvironment, keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .filter_map(|key| env.remove_env_var(key).map(|value| ((*key).to_string(), value)))
            .collect();
        Self { env, saved }
    }
}

impl Deref for ScrubbedEnv<'_> {
    type Target = BuildEnvironment;

    fn deref(&self) -> &BuildEnvironment {
        self.env
    }
}

impl DerefMut for ScrubbedEnv<'_> {
    fn deref_mut(&mut self) -> &mut BuildEnvironment {
        self.env
    }
}

impl Drop for ScrubbedEnv<'_> {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain() {
            self.env.env_vars.insert(key, value);
        }
    }
}

impl BuildEnvironment {
    /// Run a build command, announcing it and failing on a non-zero exit.
    ///
    /// `./configure` announcements drop `--disable-dependency-tracking` unless
    /// verbose. `xcodebuild` runs without the compiler and flag variables. In
    /// verbose mode the command inherits stdio; otherwise stdout and stderr are
    /// captured together and emitted only if the command fails.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CommandFailed` on a non-zero exit or signal, and
    /// `BuildError::SpawnFailed` when the command cannot be started.
    pub async fn system(&mut self, cmd: &str, args: &[&str]) -> Result<BuildCommandResult, Error> {
        let shown: Vec<String> = args
            .iter()
            .filter(|arg| self.verbose || cmd != "./configure" || **arg != ELIDED_CONFIGURE_FLAG)
            .map(|arg| (*arg).to_string())
            .collect();
        self.emit(AppEvent::Build(BuildEvent::CommandStarted {
            package: self.context.name.clone(),
            command: cmd.to_string(),
            args: shown,
            working_dir: self.working_dir.clone(),
        }));

        let program = if args.is_empty() {
            cmd.split_whitespace().next().unwrap_or(cmd)
        } else {
            cmd
        };

        let result = if program == "xcodebuild" {
            let scrubbed = ScrubbedEnv::new(self, SCRUBBED_FOR_XCODEBUILD);
            scrubbed.run(cmd, args, SCRUBBED_FOR_XCODEBUILD).await?
        } else {
            self.run(cmd, args, &[]).await?
        };

        if result.success() {
            return Ok(result);
        }

        if !result.output.is_empty() {
            self.emit(AppEvent::Build(BuildEvent::CommandOutput {
                package: self.context.name.clone(),
                command: cmd.to_string(),
                output: result.output.clone(),
            }));
        }

        let error = BuildError::CommandFailed {
            command: cmd.to_string(),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
            output: result.output,
            status: result.exit_code,
        };
        self.emit(AppEvent::Build(BuildEvent::CommandFailed {
            package: self.context.name.clone(),
            command: cmd.to_string(),
            failure: FailureContext::from_error(&error),
        }));
        Err(error.into())
    }

    /// Run a command without announcing it or judging its exit status
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started or its output cannot be read.
    pub async fn execute_command(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<BuildCommandResult, Error> {
        self.run(program, args, &[]).await
    }

    async fn run(
        &self,
        cmd: &str,
        args: &[&str],
        removed: &[&str],
    ) -> Result<BuildCommandResult, Error> {
        // A lone command string with spaces is a shell command line
        let mut command = if args.is_empty() && cmd.contains(char::is_whitespace) {
            let mut shell = Command::new("/bin/sh");
            shell.arg("-c").arg(cmd);
            shell
        } else {
            let mut direct = Command::new(cmd);
            direct.args(args);
            direct
        };

        for key in removed {
            command.env_remove(key);
        }
        command
            .envs(&self.env_vars)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());

        let spawn_failed = |e: std::io::Error| BuildError::SpawnFailed {
            command: cmd.to_string(),
            message: e.to_string(),
        };

        if self.verbose {
            let status = command
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await
                .map_err(spawn_failed)?;
            return Ok(BuildCommandResult {
                exit_code: status.code(),
                output: String::new(),
            });
        }

        // stdout and stderr share one pipe so their lines keep the order
        // the command wrote them in
        let (reader, writer) = std::io::pipe()?;
        command.stdout(writer.try_clone()?).stderr(writer);
        let spawned = command.spawn();
        // The command holds write ends until dropped; reading sees EOF only after that
        drop(command);
        let mut child = spawned.map_err(spawn_failed)?;

        let mut captured = Vec::new();
        let read = match pipe::Receiver::from_owned_fd(OwnedFd::from(reader)) {
            Ok(mut receiver) => receiver.read_to_end(&mut captured).await.map(|_| ()),
            Err(e) => Err(e),
        };
        let status = child.wait().await?;
        read?;

        Ok(BuildCommandResult {
            exit_code: status.code(),
            output: String::from_utf8_lossy(&captured).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildContext;
    use cellar_types::Version;
    use std::path::Path;

    fn env() -> BuildEnvironment {
        BuildEnvironment::new(
            BuildContext::new("demo", Version::new("1.0").unwrap()),
            Path::new("/tmp"),
            Path::new("/usr/local"),
        )
    }

    #[test]
    fn test_scrub_guard_restores_on_drop() {
        let mut env = env();
        env.set_env_var("CC", "clang");
        env.set_env_var("CFLAGS", "-O2");
        env.set_env_var("PATH_EXTRA", "/opt/bin");
        {
            let scrubbed = ScrubbedEnv::new(&mut env, SCRUBBED_FOR_XCODEBUILD);
            assert!(!scrubbed.env_vars().contains_key("CC"));
            assert!(!scrubbed.env_vars().contains_key("CFLAGS"));
            assert!(scrubbed.env_vars().contains_key("PATH_EXTRA"));
        }
        assert_eq!(env.env_vars().get("CC").map(String::as_str), Some("clang"));
        assert_eq!(env.env_vars().get("CFLAGS").map(String::as_str), Some("-O2"));
    }
}
