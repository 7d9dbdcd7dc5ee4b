//! Source locators and integrity declarations

use crate::Version;
use cellar_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which declared source a package instance was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecVariant {
    Stable,
    Devel,
    Head,
}

impl fmt::Display for SpecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Devel => write!(f, "devel"),
            Self::Head => write!(f, "head"),
        }
    }
}

/// The variant the installer asked for (`--devel`, `--HEAD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecRequest {
    #[default]
    Stable,
    Devel,
    Head,
}

/// A resolved source locator plus the options handed to its download strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareSpec {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    pub variant: SpecVariant,
}

impl SoftwareSpec {
    #[must_use]
    pub fn new(url: impl Into<String>, variant: SpecVariant) -> Self {
        Self {
            url: url.into(),
            options: BTreeMap::new(),
            variant,
        }
    }

    /// Attach a strategy option (e.g. `tag`, `branch`, `revision`)
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.variant == SpecVariant::Stable
    }

    /// Version implied by the URL, if any
    #[must_use]
    pub fn detect_version(&self) -> Option<Version> {
        Version::detect_from_url(&self.url)
    }
}

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumType {
    #[default]
    Md5,
    Sha1,
    Sha256,
}

impl ChecksumType {
    /// Upper-case label used in user-facing messages
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha1 => write!(f, "sha1"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for ChecksumType {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            _ => Err(PackageError::invalid("checksum type", s)),
        }
    }
}

/// A declared digest for the primary source artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    #[serde(default)]
    pub algorithm: ChecksumType,
    pub value: String,
}

impl Checksum {
    #[must_use]
    pub fn new(algorithm: ChecksumType, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn md5(value: impl Into<String>) -> Self {
        Self::new(ChecksumType::Md5, value)
    }

    #[must_use]
    pub fn sha1(value: impl Into<String>) -> Self {
        Self::new(ChecksumType::Sha1, value)
    }

    #[must_use]
    pub fn sha256(value: impl Into<String>) -> Self {
        Self::new(ChecksumType::Sha256, value)
    }

    /// An empty value counts as "not declared"
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Case-insensitive comparison against a computed hex digest
    #[must_use]
    pub fn matches(&self, computed: &str) -> bool {
        self.value.trim().eq_ignore_ascii_case(computed.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_matches_case_insensitively() {
        let checksum = Checksum::sha256("ABCDEF0123");
        assert!(checksum.matches("abcdef0123"));
        assert!(!checksum.matches("abcdef0124"));
        assert!(Checksum::md5("  ").is_empty());
    }

    #[test]
    fn test_checksum_type_parsing() {
        assert_eq!("SHA256".parse::<ChecksumType>().unwrap(), ChecksumType::Sha256);
        assert_eq!(ChecksumType::default(), ChecksumType::Md5);
        assert!("crc32".parse::<ChecksumType>().is_err());
    }

    #[test]
    fn test_checksum_deserializes_with_default_algorithm() {
        let checksum: Checksum = serde_json::from_str(r#"{"value":"d41d8cd9"}"#).unwrap();
        assert_eq!(checksum.algorithm, ChecksumType::Md5);
    }
}
