#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Download integrity checks
//!
//! Digests are computed by streaming the artifact in fixed-size chunks with the
//! algorithm the package declares (MD5 when none is declared) and compared
//! against the declared value without regard to case.

use cellar_errors::{BuildError, Error};
use cellar_events::{AcquisitionEvent, AppEvent, EventEmitter};
use cellar_types::{Checksum, ChecksumType};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// A computed digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: ChecksumType,
    bytes: Vec<u8>,
}

enum Hasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algorithm: ChecksumType) -> Self {
        match algorithm {
            ChecksumType::Md5 => Self::Md5(Md5::new()),
            ChecksumType::Sha1 => Self::Sha1(Sha1::new()),
            ChecksumType::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Md5(h) => h.finalize().to_vec(),
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
        }
    }
}

impl Digest {
    /// Compute the digest of a byte slice
    #[must_use]
    pub fn from_data(algorithm: ChecksumType, data: &[u8]) -> Self {
        let mut hasher = Hasher::new(algorithm);
        hasher.update(data);
        Self {
            algorithm,
            bytes: hasher.finalize(),
        }
    }

    /// Compute the digest of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn compute(path: &Path, algorithm: ChecksumType) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let mut hasher = Hasher::new(algorithm);
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(Self {
            algorithm,
            bytes: hasher.finalize(),
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> ChecksumType {
        self.algorithm
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Outcome of an integrity check that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The declared checksum matched
    Verified,
    /// Nothing was declared; `computed` is what the definition should declare
    Unverified { computed: Digest },
}

/// Verify a fetched artifact against the package's declared checksum.
///
/// An absent or empty checksum is not an error: a warning carrying the
/// computed digest is emitted instead.
///
/// # Errors
/// Returns `BuildError::ChecksumMismatch` when the digest differs, or an I/O
/// error when the artifact cannot be read.
pub async fn verify_download_integrity<E: EventEmitter>(
    path: &Path,
    checksum: Option<&Checksum>,
    emitter: &E,
) -> Result<Verification, Error> {
    let declared = checksum.filter(|c| !c.is_empty());
    let algorithm = declared.map_or_else(ChecksumType::default, |c| c.algorithm);
    let computed = Digest::compute(path, algorithm).await?;

    match declared {
        Some(expected) if expected.matches(&computed.to_hex()) => {
            emitter.emit(AppEvent::Acquisition(AcquisitionEvent::ChecksumVerified {
                path: path.to_path_buf(),
                algorithm: algorithm.label().to_string(),
                digest: computed.to_hex(),
            }));
            Ok(Verification::Verified)
        }
        Some(expected) => Err(BuildError::ChecksumMismatch {
            algorithm: algorithm.label().to_string(),
            expected: expected.value.trim().to_string(),
            actual: computed.to_hex(),
            path: path.display().to_string(),
        }
        .into()),
        None => {
            emitter.emit(AppEvent::Acquisition(AcquisitionEvent::ChecksumMissing {
                path: PathBuf::from(path),
                algorithm: algorithm.label().to_string(),
                computed: computed.to_hex(),
            }));
            Ok(Verification::Unverified { computed })
        }
    }
}
