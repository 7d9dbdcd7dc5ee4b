//! The contract download strategies fulfil

use async_trait::async_trait;
use cellar_errors::Error;
use cellar_types::{SoftwareSpec, Version};
use std::path::{Path, PathBuf};

/// What a successful fetch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedArtifact {
    /// A downloaded archive; subject to checksum verification
    File(PathBuf),
    /// A checkout or clone; never checksummed
    Directory(PathBuf),
}

impl FetchedArtifact {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Directory(path) => path,
        }
    }
}

/// Obtains and unpacks one source location.
///
/// Implementations report transport failures as `Error::Network` so the
/// coordinator can fall back to a mirror; anything else is fatal.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    /// Location this strategy was bound to
    fn url(&self) -> &str;

    /// Where the artifact lands once fetched
    fn cached_location(&self) -> Option<PathBuf>;

    async fn fetch(&self) -> Result<FetchedArtifact, Error>;

    /// Unpack the fetched artifact into `dest`
    async fn stage(&self, dest: &Path) -> Result<(), Error>;
}

/// Binds a strategy to a package name, version and source spec
pub trait StrategyFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when no strategy handles the spec.
    fn create(
        &self,
        name: &str,
        version: &Version,
        spec: &SoftwareSpec,
    ) -> Result<Box<dyn DownloadStrategy>, Error>;
}
