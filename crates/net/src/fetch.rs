//! Primary source acquisition with mirror failover

use crate::strategy::{DownloadStrategy, FetchedArtifact, StrategyFactory};
use cellar_errors::Error;
use cellar_events::{AcquisitionEvent, AppEvent, EventEmitter, FailureContext};
use cellar_hash::{verify_download_integrity, Verification};
use cellar_types::PackageSpec;
use std::collections::VecDeque;
use std::sync::Arc;

/// Classification of a single fetch attempt
#[derive(Debug)]
pub enum FetchAttempt {
    Fetched(FetchedArtifact),
    /// Transport failure with at least one mirror left to try
    Retryable(Error),
    /// Fatal failure, or transport failure with no mirrors left
    Exhausted(Error),
}

impl FetchAttempt {
    #[must_use]
    pub fn classify(result: Result<FetchedArtifact, Error>, mirrors_remaining: bool) -> Self {
        match result {
            Ok(artifact) => Self::Fetched(artifact),
            Err(err) if err.is_transport() && mirrors_remaining => Self::Retryable(err),
            Err(err) => Self::Exhausted(err),
        }
    }
}

/// A fetched artifact together with the strategy that produced it
pub struct Fetched {
    pub artifact: FetchedArtifact,
    /// Used afterwards to stage the artifact
    pub strategy: Box<dyn DownloadStrategy>,
    /// `None` for directory artifacts
    pub verification: Option<Verification>,
}

impl std::fmt::Debug for Fetched {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetched")
            .field("artifact", &self.artifact)
            .field("url", &self.strategy.url())
            .field("verification", &self.verification)
            .finish()
    }
}

/// Fetches a package's active source, falling back to mirrors on transport errors
#[derive(Clone)]
pub struct FetchCoordinator {
    factory: Arc<dyn StrategyFactory>,
}

impl FetchCoordinator {
    #[must_use]
    pub fn new(factory: Arc<dyn StrategyFactory>) -> Self {
        Self { factory }
    }

    /// Fetch and verify the package's source.
    ///
    /// Mirrors are only consulted for stable sources. Attempts run strictly
    /// one after another: primary first, then each mirror in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the last transport error once mirrors are exhausted, the first
    /// non-transport error immediately, or a checksum mismatch.
    pub async fn fetch<E: EventEmitter + Sync>(
        &self,
        spec: &PackageSpec,
        emitter: &E,
    ) -> Result<Fetched, Error> {
        let mut mirrors: VecDeque<_> = if spec.active().is_stable() {
            spec.mirrors().iter().cloned().collect()
        } else {
            VecDeque::new()
        };

        emitter.emit(AppEvent::Acquisition(AcquisitionEvent::Started {
            package: spec.name().to_string(),
            version: spec.version().clone(),
            url: spec.url().to_string(),
            mirrors: mirrors.len(),
        }));

        let mut strategy = self
            .factory
            .create(spec.name(), spec.version(), spec.active())?;

        let artifact = loop {
            let result = strategy.fetch().await;
            match FetchAttempt::classify(result, !mirrors.is_empty()) {
                FetchAttempt::Fetched(artifact) => break artifact,
                FetchAttempt::Retryable(err) => {
                    let Some(mirror) = mirrors.pop_front() else {
                        return Err(err);
                    };
                    emitter.emit(AppEvent::Acquisition(AcquisitionEvent::MirrorFallback {
                        package: spec.name().to_string(),
                        failed_url: strategy.url().to_string(),
                        mirror_url: mirror.url.clone(),
                        failure: FailureContext::from_error(&err),
                    }));
                    strategy = self.factory.create(spec.name(), spec.version(), &mirror)?;
                }
                FetchAttempt::Exhausted(err) => {
                    emitter.emit(AppEvent::Acquisition(AcquisitionEvent::Failed {
                        package: spec.name().to_string(),
                        url: strategy.url().to_string(),
                        failure: FailureContext::from_error(&err),
                    }));
                    return Err(err);
                }
            }
        };

        emitter.emit(AppEvent::Acquisition(AcquisitionEvent::Completed {
            package: spec.name().to_string(),
            url: strategy.url().to_string(),
            location: artifact.path().to_path_buf(),
        }));

        let verification = match &artifact {
            FetchedArtifact::File(path) => {
                Some(verify_download_integrity(path, spec.checksum(), emitter).await?)
            }
            FetchedArtifact::Directory(_) => None,
        };

        Ok(Fetched {
            artifact,
            strategy,
            verification,
        })
    }
}
