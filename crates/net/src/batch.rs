//! Batched downloads for small auxiliary files such as patches

use async_trait::async_trait;
use cellar_errors::{BuildError, Error, NetworkError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// One URL and the file name it is saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// Relative to the batch's working directory
    pub output: PathBuf,
}

impl DownloadRequest {
    #[must_use]
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
        }
    }
}

/// Downloads several files in a single operation
#[async_trait]
pub trait BatchDownloader: Send + Sync {
    /// # Errors
    ///
    /// Returns a network error if any request fails.
    async fn download_all(&self, requests: &[DownloadRequest], dir: &Path) -> Result<(), Error>;
}

/// Runs one `curl` process for the whole batch
#[derive(Debug, Clone)]
pub struct CurlBatchDownloader {
    curl: String,
    user_agent: String,
}

impl CurlBatchDownloader {
    #[must_use]
    pub fn new(curl: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            curl: curl.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Arguments for a single invocation covering every request
    #[must_use]
    pub fn arguments(&self, requests: &[DownloadRequest]) -> Vec<String> {
        let mut args = vec![
            "-f#L".to_string(),
            "-A".to_string(),
            self.user_agent.clone(),
        ];
        for request in requests {
            args.push(request.url.clone());
            args.push("-o".to_string());
            args.push(request.output.display().to_string());
        }
        args
    }
}

#[async_trait]
impl BatchDownloader for CurlBatchDownloader {
    async fn download_all(&self, requests: &[DownloadRequest], dir: &Path) -> Result<(), Error> {
        if requests.is_empty() {
            return Ok(());
        }

        let output = Command::new(&self.curl)
            .args(self.arguments(requests))
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| BuildError::SpawnFailed {
                command: self.curl.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let urls: Vec<_> = requests.iter().map(|r| r.url.as_str()).collect();
            Err(NetworkError::DownloadFailed(format!(
                "{} exited with {} while fetching {}: {}",
                self.curl,
                output.status,
                urls.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_invocation_arguments() {
        let curl = CurlBatchDownloader::new("curl", "Cellar/0.1.0");
        let args = curl.arguments(&[
            DownloadRequest::new("https://example.org/a.diff", "001-cellar.diff"),
            DownloadRequest::new("https://example.org/b.diff.gz", "002-cellar.diff.gz"),
        ]);
        assert_eq!(
            args,
            vec![
                "-f#L",
                "-A",
                "Cellar/0.1.0",
                "https://example.org/a.diff",
                "-o",
                "001-cellar.diff",
                "https://example.org/b.diff.gz",
                "-o",
                "002-cellar.diff.gz",
            ]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_a_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let curl = CurlBatchDownloader::new("false", "ua");
        let err = curl
            .download_all(
                &[DownloadRequest::new("https://example.org/a.diff", "a")],
                dir.path(),
            )
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_empty_batch_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let curl = CurlBatchDownloader::new("/nonexistent/curl", "ua");
        assert!(curl.download_all(&[], dir.path()).await.is_ok());
    }
}
