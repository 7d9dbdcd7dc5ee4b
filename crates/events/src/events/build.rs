use cellar_types::{Compiler, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// States of a single package build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Unstaged,
    Staged,
    Patched,
    Building,
    Succeeded,
    Recovering,
    Failed,
}

impl BuildState {
    /// Terminal states end the session
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Recovering | Self::Failed)
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstaged => "unstaged",
            Self::Staged => "staged",
            Self::Patched => "patched",
            Self::Building => "building",
            Self::Succeeded => "succeeded",
            Self::Recovering => "recovering",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Build-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    SessionStarted {
        package: String,
        version: Version,
    },

    /// The session moved into a new state
    PhaseStarted {
        package: String,
        phase: BuildState,
    },

    /// Command announcement, with elided arguments already removed
    CommandStarted {
        package: String,
        command: String,
        args: Vec<String>,
        working_dir: PathBuf,
    },

    /// Merged stdout/stderr of a failed command
    CommandOutput {
        package: String,
        command: String,
        output: String,
    },

    CommandFailed {
        package: String,
        command: String,
        failure: super::FailureContext,
    },

    /// The active compiler was replaced because of a declared incompatibility
    CompilerSwitched {
        package: String,
        from: Compiler,
        to: Compiler,
        reason: String,
    },

    /// The active compiler is known to fail but the build continues with it
    CompilerAdvisory {
        package: String,
        compiler: Compiler,
        reason: String,
        override_flag: String,
    },

    /// A fault inside the build, with its cause chain
    Failed {
        package: String,
        failure: super::FailureContext,
        trace: Vec<String>,
    },

    /// `./configure` failed and left a log behind
    ConfigureHint {
        package: String,
        log: PathBuf,
    },

    /// Handing control to the operator in the build directory
    RecoveryStarted {
        package: String,
        prefix: PathBuf,
        working_dir: PathBuf,
    },

    RecoveryFinished {
        package: String,
        shell_status: Option<i32>,
    },

    /// Build logs copied to the per-user log directory
    DiagnosticsPreserved {
        package: String,
        files: Vec<PathBuf>,
        destination: PathBuf,
    },

    Completed {
        package: String,
        version: Version,
        prefix: PathBuf,
    },
}

impl BuildEvent {
    pub(crate) fn message(&self) -> String {
        match self {
            Self::SessionStarted { package, version } => format!("Building {package} {version}"),
            Self::PhaseStarted { package, phase } => format!("{package}: {phase}"),
            Self::CommandStarted { command, args, .. } => {
                if args.is_empty() {
                    command.clone()
                } else {
                    format!("{command} {}", args.join(" "))
                }
            }
            Self::CommandOutput { output, .. } => output.clone(),
            Self::CommandFailed {
                command, failure, ..
            } => format!("{command} failed: {}", failure.message),
            Self::CompilerSwitched {
                package, from, to, ..
            } => format!("{package} does not build with {from}; using {to} instead"),
            Self::CompilerAdvisory {
                package,
                compiler,
                reason,
                override_flag,
            } => format!(
                "{package} is known not to build with {compiler}:\n{reason}\nWe are continuing anyway so if the build succeeds, please report it.\nIf it doesn't, try again with {override_flag}."
            ),
            Self::Failed {
                package, failure, ..
            } => format!("{package} failed: {}", failure.message),
            Self::ConfigureHint { log, .. } => format!(
                "It looks like an autotools configure failed.\nGist {} and then report an issue.",
                log.display()
            ),
            Self::RecoveryStarted {
                prefix,
                working_dir,
                ..
            } => format!(
                "Rescuing build...\nWhen you exit this shell the build continues as if it succeeded.\nInstall to this prefix: {}\nWorking directory: {}",
                prefix.display(),
                working_dir.display()
            ),
            Self::RecoveryFinished {
                package,
                shell_status,
            } => match shell_status {
                Some(code) => format!("{package}: operator shell exited with status {code}"),
                None => format!("{package}: operator shell terminated by signal"),
            },
            Self::DiagnosticsPreserved {
                files,
                destination,
                ..
            } => format!(
                "Copied {} build logs to {}",
                files.len(),
                destination.display()
            ),
            Self::Completed {
                package,
                version,
                prefix,
            } => format!("{package} {version} installed to {}", prefix.display()),
        }
    }
}
