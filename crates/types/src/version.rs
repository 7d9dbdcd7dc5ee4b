//! Package and toolchain versions
//!
//! Package versions are opaque strings (`1.2.3`, `2.0b1`, `HEAD`) that only need
//! to be non-empty and free of whitespace. When a definition omits the version it
//! is detected from the source URL. Toolchain versions are dotted numbers
//! compared component-wise.

use cellar_errors::PackageError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Version string used for head (development) builds
pub const HEAD: &str = "HEAD";

const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tar.bz2", ".tar.xz", ".tar.lz", ".tar.Z", ".tgz", ".tbz", ".tbz2", ".txz",
    ".zip", ".tar", ".gz", ".bz2", ".xz", ".7z", ".dmg", ".jar", ".rb",
];

// Checked in order against the file stem.
static VERSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // v1.2.3 / 1.2.3 (tag tarballs)
        r"^v?(\d+(?:\.\d+)+[a-z]?)$",
        // foo-1.2.3, foo-1.2b1, foo-2.0-rc1, foo-v1.4
        r"-v?(\d+(?:\.\d+)*(?:[-._]?(?:alpha|beta|rc|pre|a|b)\d*)?[a-z]?)$",
        // foo_1.2.3
        r"_v?(\d+(?:\.\d+)+[a-z]?)$",
        // foo.v12
        r"\.v(\d+[a-z]?)$",
        // foo1.2.3
        r"(\d+(?:\.\d+)+)$",
        // bare number, e.g. a date stamp
        r"^v?(\d+)$",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

static BOTTLE_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\.[a-z_]+\.bottle(?:\.\d+)?$").ok());

/// A validated package version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Create a version, rejecting empty strings and whitespace
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidField` if the value is empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, PackageError> {
        let value = value.into();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(PackageError::invalid("version", value));
        }
        Ok(Self(value))
    }

    /// The version used for head builds
    #[must_use]
    pub fn head() -> Self {
        Self(HEAD.to_string())
    }

    #[must_use]
    pub fn is_head(&self) -> bool {
        self.0 == HEAD
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Detect a version from the last path segment of a URL
    #[must_use]
    pub fn detect_from_url(url: &str) -> Option<Self> {
        let stem = url_stem(url)?;
        VERSION_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(&stem)
                .and_then(|caps| caps.get(1))
                .and_then(|m| Self::new(m.as_str()).ok())
        })
    }
}

/// Strip query, fragment, archive extensions and bottle tags from a URL's basename.
fn url_stem(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let basename = path.trim_end_matches('/').rsplit('/').next()?;
    if basename.is_empty() {
        return None;
    }

    let mut stem = basename.to_string();
    if let Some(ext) = ARCHIVE_EXTENSIONS.iter().find(|ext| stem.ends_with(*ext)) {
        stem.truncate(stem.len() - ext.len());
    }
    if let Some(tag) = BOTTLE_TAG.as_ref().and_then(|re| re.find(&stem)) {
        stem.truncate(tag.start());
    }
    Some(stem)
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Version {
    type Error = PackageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Dotted numeric version of the host toolchain (e.g. Xcode `4.3.2`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ToolchainVersion {
    raw: String,
    components: Vec<u64>,
}

impl ToolchainVersion {
    /// Parse a dotted version; non-numeric components count as their leading digits.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let components = raw
            .trim()
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect();
        Self {
            raw: raw.trim().to_string(),
            components,
        }
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for ToolchainVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToolchainVersion {}

impl PartialOrd for ToolchainVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ToolchainVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for ToolchainVersion {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ToolchainVersion> for String {
    fn from(version: ToolchainVersion) -> Self {
        version.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(url: &str) -> Option<String> {
        Version::detect_from_url(url).map(String::from)
    }

    #[test]
    fn test_version_validation() {
        assert!(Version::new("1.2.3").is_ok());
        assert!(Version::new("").is_err());
        assert!(Version::new("1.2 beta").is_err());
        assert!(Version::head().is_head());
    }

    #[test]
    fn test_detect_common_layouts() {
        assert_eq!(
            detect("https://example.com/foo-1.2.3.tar.gz").as_deref(),
            Some("1.2.3")
        );
        assert_eq!(
            detect("https://example.com/foo_2.0.1.tar.bz2").as_deref(),
            Some("2.0.1")
        );
        assert_eq!(
            detect("https://github.com/org/foo/archive/v0.9.1.tar.gz").as_deref(),
            Some("0.9.1")
        );
        assert_eq!(
            detect("ftp://ftp.gnu.org/gnu/wget/wget-1.13.4.tar.xz?mirror=1").as_deref(),
            Some("1.13.4")
        );
        assert_eq!(detect("https://example.com/foo-2.0b1.zip").as_deref(), Some("2.0b1"));
        assert_eq!(detect("https://example.com/foo").as_deref(), None);
    }

    #[test]
    fn test_detect_bottle_version() {
        assert_eq!(
            detect("https://example.com/bottles/foo-1.4.2.lion.bottle.tar.gz").as_deref(),
            Some("1.4.2")
        );
    }

    #[test]
    fn test_toolchain_ordering() {
        assert!(ToolchainVersion::parse("4.1") < ToolchainVersion::parse("4.2"));
        assert!(ToolchainVersion::parse("4.2") == ToolchainVersion::parse("4.2.0"));
        assert!(ToolchainVersion::parse("4.10") > ToolchainVersion::parse("4.2"));
        assert!(ToolchainVersion::parse("3.2.6") < ToolchainVersion::parse("4.2"));
    }
}
