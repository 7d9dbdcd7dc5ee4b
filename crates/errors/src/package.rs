//! Package-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackageError {
    #[error("invalid {field} for package: {value:?}")]
    InvalidField { field: String, value: String },

    #[error("missing {field} for package {name}")]
    MissingField { name: String, field: String },

    #[error("no available package with the name \"{name}\"")]
    Unavailable { name: String },

    #[error("cyclic dependency: {chain}")]
    CyclicDependency { chain: String },

    #[error("unsupported dependency type {kind} for {name}")]
    UnsupportedDependency { name: String, kind: String },
}

impl PackageError {
    /// Validation failure for a named field.
    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { .. } | Self::MissingField { .. } => {
                Some("Fix the package definition before retrying.")
            }
            Self::Unavailable { .. } => Some("Check the spelling of the package name."),
            Self::CyclicDependency { .. } => {
                Some("Remove one of the dependency declarations that forms the cycle.")
            }
            Self::UnsupportedDependency { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidField { .. } => "package.invalid_field",
            Self::MissingField { .. } => "package.missing_field",
            Self::Unavailable { .. } => "package.unavailable",
            Self::CyclicDependency { .. } => "package.cyclic_dependency",
            Self::UnsupportedDependency { .. } => "package.unsupported_dependency",
        };
        Some(code)
    }
}
