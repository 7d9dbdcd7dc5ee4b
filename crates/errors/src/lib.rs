#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the cellar build engine
//!
//! Each pipeline stage has its own error enum; `Error` wraps them at crate
//! boundaries. Errors are `Clone` so failure details can be copied into events.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod build;
pub mod config;
pub mod network;
pub mod package;

pub use build::BuildError;
pub use config::ConfigError;
pub use network::NetworkError;
pub use package::PackageError;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("package error: {0}")]
    Package(#[from] PackageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("internal error: {0}")]
    Internal(String),

    /// The build was interrupted by the user
    #[error("interrupted")]
    Cancelled,

    #[error("{}", describe_io(.message, .path.as_deref()))]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<PathBuf>,
    },
}

fn describe_io(message: &str, path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("{}: {message}", path.display()),
        None => message.to_string(),
    }
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// I/O failure on a specific file or directory
    pub fn io_with_path(err: &std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Whether this is a transport failure a mirror could recover from.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// The build failure wrapped by this error, if any.
    #[must_use]
    pub fn as_build(&self) -> Option<&BuildError> {
        match self {
            Self::Build(err) => Some(err),
            _ => None,
        }
    }

    fn domain(&self) -> Option<&dyn UserFacingError> {
        match self {
            Self::Network(err) => Some(err),
            Self::Package(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Build(err) => Some(err),
            Self::Internal(_) | Self::Cancelled | Self::Io { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// What a user needs to know about a failure, without the wrapping layers.
pub trait UserFacingError {
    /// One-line description of what went wrong.
    fn user_message(&self) -> Cow<'_, str>;

    /// What the user can do about it.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable dotted code such as `build.patch_failed`.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self.domain() {
            Some(err) => err.user_message(),
            None => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        self.domain().and_then(UserFacingError::user_hint)
    }

    fn is_retryable(&self) -> bool {
        self.domain().is_some_and(UserFacingError::is_retryable)
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::Internal(_) => Some("error.internal"),
            Self::Cancelled => Some("error.cancelled"),
            Self::Io { .. } => Some("error.io"),
            _ => self.domain().and_then(UserFacingError::user_code),
        }
    }
}
