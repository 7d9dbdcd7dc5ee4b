//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error(
        "{algorithm} mismatch\nExpected: {expected}\nGot: {actual}\nArchive: {path}\n\
         (To retry an incomplete download, remove the file above.)"
    )]
    ChecksumMismatch {
        algorithm: String,
        expected: String,
        actual: String,
        path: String,
    },

    #[error("patch {patch} failed to apply with -{strip}{}", status_suffix(.status))]
    PatchFailed {
        patch: String,
        strip: String,
        status: Option<i32>,
        output: String,
    },

    #[error("failed executing: {command} {}{}", .args.join(" "), status_suffix(.status))]
    CommandFailed {
        command: String,
        args: Vec<String>,
        output: String,
        status: Option<i32>,
    },

    #[error("could not run {command}: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("staging failed: {message}")]
    StageFailed { message: String },

    #[error("could not decompress {path}: {message}")]
    DecompressionFailed { path: String, message: String },
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (exit status {code})"),
        None => " (terminated by signal)".to_string(),
    }
}

impl BuildError {
    /// Whether this failure came from an autotools `configure` script.
    #[must_use]
    pub fn was_running_configure(&self) -> bool {
        match self {
            Self::CommandFailed { command, .. } => {
                command == "./configure" || command.ends_with("/configure")
            }
            _ => false,
        }
    }

    /// Captured output attached to the failure, if any.
    #[must_use]
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { output, .. } | Self::PatchFailed { output, .. } => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ChecksumMismatch { .. } => {
                Some("Delete the cached download so it is fetched again, then retry.")
            }
            Self::PatchFailed { .. } => {
                Some("Update the patch so it applies cleanly to the current sources.")
            }
            Self::CommandFailed { .. } if self.was_running_configure() => {
                Some("Include config.log and any error output when reporting an issue.")
            }
            Self::SpawnFailed { .. } => Some("Ensure the build tool is installed and on PATH."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ChecksumMismatch { .. } => "build.checksum_mismatch",
            Self::PatchFailed { .. } => "build.patch_failed",
            Self::CommandFailed { .. } => "build.command_failed",
            Self::SpawnFailed { .. } => "build.spawn_failed",
            Self::StageFailed { .. } => "build.stage_failed",
            Self::DecompressionFailed { .. } => "build.decompression_failed",
        };
        Some(code)
    }
}
