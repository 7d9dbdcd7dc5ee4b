//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Transport failures raised by download strategies.
///
/// These are the only failures the fetch coordinator treats as recoverable by
/// moving on to the next mirror.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("download failed: {0}")]
    DownloadFailed(String),
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Check your network connection and retry.")
    }

    fn is_retryable(&self) -> bool {
        true
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::DownloadFailed(_) => Some("network.download_failed"),
        }
    }
}
