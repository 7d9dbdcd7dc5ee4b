//! Integration tests for the fetch coordinator

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use cellar_errors::{BuildError, Error, NetworkError};
    use cellar_events::{channel, AcquisitionEvent, AppEvent};
    use cellar_hash::Verification;
    use cellar_net::*;
    use cellar_types::{
        Checksum, PackageDefinition, PackageSpec, SoftwareSpec, SpecRequest, Version,
    };
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    enum Outcome {
        File(PathBuf),
        Directory(PathBuf),
        Transport,
        Fatal,
    }

    struct FakeStrategy {
        url: String,
        outcome: Outcome,
    }

    #[async_trait]
    impl DownloadStrategy for FakeStrategy {
        fn url(&self) -> &str {
            &self.url
        }

        fn cached_location(&self) -> Option<PathBuf> {
            None
        }

        async fn fetch(&self) -> Result<FetchedArtifact, Error> {
            match &self.outcome {
                Outcome::File(path) => Ok(FetchedArtifact::File(path.clone())),
                Outcome::Directory(path) => Ok(FetchedArtifact::Directory(path.clone())),
                Outcome::Transport => {
                    Err(NetworkError::DownloadFailed(format!("{} unreachable", self.url)).into())
                }
                Outcome::Fatal => Err(BuildError::StageFailed {
                    message: "unsupported archive".into(),
                }
                .into()),
            }
        }

        async fn stage(&self, _dest: &Path) -> Result<(), Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeFactory {
        outcomes: HashMap<String, Outcome>,
        created: Mutex<Vec<String>>,
    }

    impl FakeFactory {
        fn with(mut self, url: &str, outcome: Outcome) -> Self {
            self.outcomes.insert(url.to_string(), outcome);
            self
        }

        fn created(&self) -> Vec<String> {
            self.created.lock().unwrap().clone()
        }
    }

    impl StrategyFactory for FakeFactory {
        fn create(
            &self,
            _name: &str,
            _version: &Version,
            spec: &SoftwareSpec,
        ) -> Result<Box<dyn DownloadStrategy>, Error> {
            self.created.lock().unwrap().push(spec.url.clone());
            Ok(Box::new(FakeStrategy {
                url: spec.url.clone(),
                outcome: self
                    .outcomes
                    .get(&spec.url)
                    .cloned()
                    .unwrap_or(Outcome::Transport),
            }))
        }
    }

    const PRIMARY: &str = "https://primary.example.org/foo-1.0.tar.gz";
    const M1: &str = "https://m1.example.org/foo-1.0.tar.gz";
    const M2: &str = "https://m2.example.org/foo-1.0.tar.gz";

    fn spec(checksum: Option<Checksum>) -> PackageSpec {
        let mut def = PackageDefinition::new("foo")
            .with_url(PRIMARY)
            .with_mirror(M1)
            .with_mirror(M2);
        def.checksum = checksum;
        PackageSpec::from_definition(def, SpecRequest::Stable).unwrap()
    }

    fn archive(dir: &Path) -> PathBuf {
        let path = dir.join("foo-1.0.tar.gz");
        std::fs::write(&path, b"hello world").unwrap();
        path
    }

    #[tokio::test]
    async fn test_falls_back_to_second_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let path = archive(dir.path());
        let factory = Arc::new(FakeFactory::default().with(M2, Outcome::File(path.clone())));
        let coordinator = FetchCoordinator::new(factory.clone());
        let (tx, mut rx) = channel();

        let fetched = coordinator
            .fetch(
                &spec(Some(Checksum::md5("5eb63bbbe01eeed093cb22bb8f5acdc3"))),
                &tx,
            )
            .await
            .unwrap();

        assert_eq!(fetched.artifact, FetchedArtifact::File(path));
        assert_eq!(fetched.strategy.url(), M2);
        assert_eq!(fetched.verification, Some(Verification::Verified));
        assert_eq!(factory.created(), vec![PRIMARY, M1, M2]);

        drop(tx);
        let mut fallbacks = 0;
        while let Some(event) = rx.recv().await {
            if matches!(
                event,
                AppEvent::Acquisition(AcquisitionEvent::MirrorFallback { .. })
            ) {
                fallbacks += 1;
            }
        }
        assert_eq!(fallbacks, 2);
    }

    #[tokio::test]
    async fn test_all_sources_failing_returns_last_transport_error() {
        let factory = Arc::new(FakeFactory::default());
        let coordinator = FetchCoordinator::new(factory.clone());
        let (tx, _rx) = channel();

        let err = coordinator.fetch(&spec(None), &tx).await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("m2.example.org"));
        assert_eq!(factory.created().len(), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_skips_mirrors() {
        let factory = Arc::new(FakeFactory::default().with(PRIMARY, Outcome::Fatal));
        let coordinator = FetchCoordinator::new(factory.clone());
        let (tx, _rx) = channel();

        let err = coordinator.fetch(&spec(None), &tx).await.unwrap_err();
        assert!(matches!(err, Error::Build(BuildError::StageFailed { .. })));
        assert_eq!(factory.created(), vec![PRIMARY]);
    }

    #[tokio::test]
    async fn test_head_sources_never_use_mirrors() {
        let def = PackageDefinition::new("foo")
            .with_url(PRIMARY)
            .with_mirror(M1)
            .with_head("https://git.example.org/foo.git");
        let head = PackageSpec::from_definition(def, SpecRequest::Head).unwrap();
        let factory = Arc::new(FakeFactory::default());
        let coordinator = FetchCoordinator::new(factory.clone());
        let (tx, _rx) = channel();

        assert!(coordinator.fetch(&head, &tx).await.is_err());
        assert_eq!(factory.created(), vec!["https://git.example.org/foo.git"]);
    }

    #[tokio::test]
    async fn test_checksum_mismatch_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = archive(dir.path());
        let factory = Arc::new(FakeFactory::default().with(PRIMARY, Outcome::File(path)));
        let coordinator = FetchCoordinator::new(factory);
        let (tx, _rx) = channel();

        let err = coordinator
            .fetch(&spec(Some(Checksum::md5("0".repeat(32)))), &tx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::ChecksumMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_directory_artifacts_are_not_verified() {
        let dir = tempfile::tempdir().unwrap();
        let factory = Arc::new(
            FakeFactory::default().with(PRIMARY, Outcome::Directory(dir.path().to_path_buf())),
        );
        let coordinator = FetchCoordinator::new(factory);
        let (tx, _rx) = channel();

        let fetched = coordinator
            .fetch(&spec(Some(Checksum::md5("0".repeat(32)))), &tx)
            .await
            .unwrap();
        assert!(fetched.verification.is_none());
    }
}
