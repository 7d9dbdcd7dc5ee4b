//! Patch planning and application
//!
//! Every declared patch gets a numbered file in the build directory
//! (`001-cellar.diff`, `002-cellar.diff`, ...). Embedded diffs are written out,
//! remote ones are fetched together in one batch and decompressed, local ones
//! are applied from where they already are.

use crate::BuildEnvironment;
use async_compression::tokio::bufread::{BzDecoder, GzipDecoder};
use cellar_errors::{BuildError, Error};
use cellar_events::{AppEvent, EventEmitter, FailureContext, PatchEvent};
use cellar_net::{BatchDownloader, DownloadRequest};
use cellar_types::{PatchDeclaration, PatchSource, StripLevel};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};

/// Token in embedded diffs replaced by the install prefix
pub const PREFIX_PLACEHOLDER: &str = "CELLAR_PREFIX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Bzip2,
}

impl Compression {
    fn from_url(url: &str) -> Option<Self> {
        if url.ends_with(".gz") {
            Some(Self::Gzip)
        } else if url.ends_with(".bz2") {
            Some(Self::Bzip2)
        } else {
            None
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Bzip2 => "bz2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchKind {
    Embedded(String),
    Remote {
        url: String,
        compression: Option<Compression>,
    },
    /// Path relative to the build directory
    Local(PathBuf),
}

/// One `patch` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchJob {
    pub strip: StripLevel,
    pub kind: PatchKind,
    /// File handed to the patch tool
    pub file: PathBuf,
}

impl PatchJob {
    /// Name the remote patch is saved under before decompression
    #[must_use]
    pub fn download_name(&self) -> Option<PathBuf> {
        match &self.kind {
            PatchKind::Remote {
                compression: Some(compression),
                ..
            } => {
                let mut name = self.file.clone().into_os_string();
                name.push(".");
                name.push(compression.extension());
                Some(PathBuf::from(name))
            }
            PatchKind::Remote { .. } => Some(self.file.clone()),
            _ => None,
        }
    }
}

/// Ordered patch jobs for a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    jobs: Vec<PatchJob>,
}

impl PatchPlan {
    /// Normalise a declaration into numbered jobs.
    ///
    /// Every source consumes a number, including local paths that keep their
    /// own name, so numbering is stable under reordering of source kinds.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the URL pattern fails to compile.
    pub fn from_declaration(declaration: &PatchDeclaration) -> Result<Self, Error> {
        let remote = Regex::new(r"^\w+://").map_err(|e| Error::internal(e.to_string()))?;
        let mut jobs = Vec::new();
        let mut number = 0usize;

        for (strip, sources) in declaration.by_strip_level() {
            for source in sources {
                number += 1;
                let numbered = PathBuf::from(format!("{number:03}-cellar.diff"));
                let job = match source {
                    PatchSource::Embedded(text) => PatchJob {
                        strip,
                        kind: PatchKind::Embedded(text),
                        file: numbered,
                    },
                    PatchSource::Location(location) if remote.is_match(&location) => PatchJob {
                        strip,
                        kind: PatchKind::Remote {
                            compression: Compression::from_url(&location),
                            url: location,
                        },
                        file: numbered,
                    },
                    PatchSource::Location(location) => PatchJob {
                        strip,
                        file: PathBuf::from(&location),
                        kind: PatchKind::Local(PathBuf::from(location)),
                    },
                };
                jobs.push(job);
            }
        }

        Ok(Self { jobs })
    }

    #[must_use]
    pub fn jobs(&self) -> &[PatchJob] {
        &self.jobs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Downloads needed for the remote jobs, in plan order
    #[must_use]
    pub fn remote_requests(&self) -> Vec<DownloadRequest> {
        self.jobs
            .iter()
            .filter_map(|job| match (&job.kind, job.download_name()) {
                (PatchKind::Remote { url, .. }, Some(name)) => {
                    Some(DownloadRequest::new(url.clone(), name))
                }
                _ => None,
            })
            .collect()
    }
}

/// Applies a `PatchPlan` in the build environment's working directory
pub struct PatchEngine<'a> {
    downloader: &'a dyn BatchDownloader,
}

impl<'a> PatchEngine<'a> {
    #[must_use]
    pub fn new(downloader: &'a dyn BatchDownloader) -> Self {
        Self { downloader }
    }

    /// Materialise, download, decompress and apply every patch in order.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::PatchFailed` when the patch tool rejects a patch,
    /// a network error when the batch download fails, and I/O or
    /// decompression errors while preparing patch files.
    pub async fn apply(&self, plan: &PatchPlan, env: &BuildEnvironment) -> Result<(), Error> {
        if plan.is_empty() {
            return Ok(());
        }

        env.emit(AppEvent::Patch(PatchEvent::Planned {
            package: env.package_name().to_string(),
            count: plan.jobs().len(),
        }));

        let workdir = env.working_dir().to_path_buf();
        let prefix = env.install_prefix().display().to_string();

        for job in plan.jobs() {
            if let PatchKind::Embedded(text) = &job.kind {
                let path = workdir.join(&job.file);
                fs::write(&path, text.replace(PREFIX_PLACEHOLDER, &prefix))
                    .await
                    .map_err(|e| Error::io_with_path(&e, &path))?;
            }
        }

        let requests = plan.remote_requests();
        if !requests.is_empty() {
            env.emit(AppEvent::Patch(PatchEvent::DownloadStarted {
                urls: requests.iter().map(|r| r.url.clone()).collect(),
            }));
            self.downloader.download_all(&requests, &workdir).await?;
            env.emit(AppEvent::Patch(PatchEvent::DownloadCompleted {
                count: requests.len(),
            }));
        }

        for job in plan.jobs() {
            if let (
                PatchKind::Remote {
                    compression: Some(compression),
                    ..
                },
                Some(name),
            ) = (&job.kind, job.download_name())
            {
                let from = workdir.join(name);
                let to = workdir.join(&job.file);
                decompress(&from, &to, *compression).await?;
                env.emit(AppEvent::Patch(PatchEvent::Decompressed { from, to }));
            }

            apply_job(job, env).await?;
        }

        Ok(())
    }
}

async fn apply_job(job: &PatchJob, env: &BuildEnvironment) -> Result<(), Error> {
    let strip = job.strip.to_string();
    env.emit(AppEvent::Patch(PatchEvent::Applying {
        file: job.file.clone(),
        strip: strip.clone(),
    }));

    let strip_flag = format!("-{strip}");
    let file = job.file.display().to_string();
    let result = env
        .execute_command(env.patch_tool(), &[strip_flag.as_str(), "-f", "-i", file.as_str()])
        .await?;

    if !result.success() {
        let error = BuildError::PatchFailed {
            patch: file,
            strip,
            status: result.exit_code,
            output: result.output,
        };
        env.emit(AppEvent::Patch(PatchEvent::Failed {
            file: job.file.clone(),
            failure: FailureContext::from_error(&error),
        }));
        return Err(error.into());
    }

    env.emit(AppEvent::Patch(PatchEvent::Applied {
        file: job.file.clone(),
    }));
    Ok(())
}

/// Decompress `from` into `to` and remove the compressed file
async fn decompress(from: &Path, to: &Path, compression: Compression) -> Result<(), Error> {
    let input = File::open(from)
        .await
        .map(BufReader::new)
        .map_err(|e| Error::io_with_path(&e, from))?;
    let mut output = File::create(to)
        .await
        .map_err(|e| Error::io_with_path(&e, to))?;

    let copied = match compression {
        Compression::Gzip => tokio::io::copy(&mut GzipDecoder::new(input), &mut output).await,
        Compression::Bzip2 => tokio::io::copy(&mut BzDecoder::new(input), &mut output).await,
    };
    copied.map_err(|e| BuildError::DecompressionFailed {
        path: from.display().to_string(),
        message: e.to_string(),
    })?;
    output.flush().await?;

    fs::remove_file(from)
        .await
        .map_err(|e| Error::io_with_path(&e, from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration() -> PatchDeclaration {
        PatchDeclaration::ByStrip(vec![
            (
                StripLevel::P0,
                vec![
                    PatchSource::location("https://example.com/fix-build.diff.gz"),
                    PatchSource::Embedded("--- a\n+++ b\n".to_string()),
                ],
            ),
            (
                StripLevel::P1,
                vec![
                    PatchSource::location("patches/local.diff"),
                    PatchSource::location("ftp://mirror.example.org/p.diff.bz2"),
                    PatchSource::location("http://example.com/plain.patch"),
                ],
            ),
        ])
    }

    #[test]
    fn test_every_source_consumes_a_number() {
        let plan = PatchPlan::from_declaration(&declaration()).unwrap();
        let files: Vec<_> = plan.jobs().iter().map(|j| j.file.clone()).collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("001-cellar.diff"),
                PathBuf::from("002-cellar.diff"),
                PathBuf::from("patches/local.diff"),
                PathBuf::from("004-cellar.diff"),
                PathBuf::from("005-cellar.diff"),
            ]
        );
        assert_eq!(plan.jobs()[0].strip, StripLevel::P0);
        assert_eq!(plan.jobs()[4].strip, StripLevel::P1);
    }

    #[test]
    fn test_remote_requests_carry_compression_suffix() {
        let plan = PatchPlan::from_declaration(&declaration()).unwrap();
        let requests = plan.remote_requests();
        assert_eq!(
            requests,
            vec![
                DownloadRequest::new("https://example.com/fix-build.diff.gz", "001-cellar.diff.gz"),
                DownloadRequest::new("ftp://mirror.example.org/p.diff.bz2", "004-cellar.diff.bz2"),
                DownloadRequest::new("http://example.com/plain.patch", "005-cellar.diff"),
            ]
        );
    }

    #[test]
    fn test_bare_list_is_p1_and_paths_are_local() {
        let decl = PatchDeclaration::List(vec![PatchSource::location("file:/not/a/url.diff")]);
        let plan = PatchPlan::from_declaration(&decl).unwrap();
        assert_eq!(plan.jobs()[0].strip, StripLevel::P1);
        assert!(matches!(plan.jobs()[0].kind, PatchKind::Local(_)));
        assert!(plan.remote_requests().is_empty());
    }

    #[test]
    fn test_empty_declaration_gives_empty_plan() {
        assert!(PatchPlan::from_declaration(&PatchDeclaration::None)
            .unwrap()
            .is_empty());
    }
}
