use cellar_types::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source acquisition domain events: fetching, mirror failover and integrity checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AcquisitionEvent {
    /// Fetch of the primary source started
    Started {
        package: String,
        version: Version,
        url: String,
        mirrors: usize,
    },

    /// A transport failure moved the fetch on to the next mirror
    MirrorFallback {
        package: String,
        failed_url: String,
        mirror_url: String,
        failure: super::FailureContext,
    },

    /// Artifact obtained
    Completed {
        package: String,
        url: String,
        location: PathBuf,
    },

    /// Every source failed
    Failed {
        package: String,
        url: String,
        failure: super::FailureContext,
    },

    /// Declared checksum matched the artifact
    ChecksumVerified {
        path: PathBuf,
        algorithm: String,
        digest: String,
    },

    /// No checksum declared; carries the digest the definition should declare
    ChecksumMissing {
        path: PathBuf,
        algorithm: String,
        computed: String,
    },
}

impl AcquisitionEvent {
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Started {
                package,
                version,
                url,
                ..
            } => format!("Downloading {package} {version} from {url}"),
            Self::MirrorFallback {
                failed_url,
                mirror_url,
                failure,
                ..
            } => format!(
                "Download of {failed_url} failed ({}); trying mirror {mirror_url}",
                failure.message
            ),
            Self::Completed { url, location, .. } => {
                format!("Fetched {url} to {}", location.display())
            }
            Self::Failed { url, failure, .. } => {
                format!("Download of {url} failed: {}", failure.message)
            }
            Self::ChecksumVerified {
                path, algorithm, ..
            } => format!("{algorithm} verified for {}", path.display()),
            Self::ChecksumMissing {
                algorithm,
                computed,
                ..
            } => format!(
                "Cannot verify package integrity\nThe package definition did not provide a download checksum\nFor your reference the {algorithm} is: {computed}"
            ),
        }
    }
}
