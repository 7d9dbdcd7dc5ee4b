use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Patch engine events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatchEvent {
    /// Patches were planned for the build
    Planned { package: String, count: usize },

    /// One batched download for every remote patch
    DownloadStarted { urls: Vec<String> },

    DownloadCompleted { count: usize },

    /// A compressed patch was expanded in place
    Decompressed { from: PathBuf, to: PathBuf },

    /// About to run the patch tool
    Applying { file: PathBuf, strip: String },

    Applied { file: PathBuf },

    Failed {
        file: PathBuf,
        failure: super::FailureContext,
    },
}

impl PatchEvent {
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Planned { package, count } => format!("Patching {package} ({count} patches)"),
            Self::DownloadStarted { urls } => format!("Downloading patches: {}", urls.join(" ")),
            Self::DownloadCompleted { count } => format!("Downloaded {count} patches"),
            Self::Decompressed { from, to } => {
                format!("Decompressed {} to {}", from.display(), to.display())
            }
            Self::Applying { file, strip } => {
                format!("Applying {} with -{strip}", file.display())
            }
            Self::Applied { file } => format!("Applied {}", file.display()),
            Self::Failed { file, failure } => {
                format!("Patch {} failed: {}", file.display(), failure.message)
            }
        }
    }
}
