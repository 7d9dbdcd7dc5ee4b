//! Dependency references

use crate::PackageSpec;
use cellar_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Foreign package ecosystems a package can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Python,
    Perl,
    Ruby,
    JRuby,
    Chicken,
    Rbx,
    Node,
    Lua,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Python => "python",
            Self::Perl => "perl",
            Self::Ruby => "ruby",
            Self::JRuby => "jruby",
            Self::Chicken => "chicken",
            Self::Rbx => "rbx",
            Self::Node => "node",
            Self::Lua => "lua",
        };
        f.write_str(name)
    }
}

impl FromStr for Ecosystem {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Self::Python),
            "perl" => Ok(Self::Perl),
            "ruby" => Ok(Self::Ruby),
            "jruby" => Ok(Self::JRuby),
            "chicken" => Ok(Self::Chicken),
            "rbx" => Ok(Self::Rbx),
            "node" => Ok(Self::Node),
            "lua" => Ok(Self::Lua),
            _ => Err(PackageError::invalid("ecosystem", s)),
        }
    }
}

/// How a dependency is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKind {
    Required,
    Optional,
    Recommended,
    Build,
    External(Ecosystem),
}

impl DepKind {
    #[must_use]
    pub fn is_external(self) -> bool {
        matches!(self, Self::External(_))
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Optional => write!(f, "optional"),
            Self::Recommended => write!(f, "recommended"),
            Self::Build => write!(f, "build"),
            Self::External(ecosystem) => write!(f, "{ecosystem}"),
        }
    }
}

impl FromStr for DepKind {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "optional" => Ok(Self::Optional),
            "recommended" => Ok(Self::Recommended),
            "build" => Ok(Self::Build),
            other => other.parse().map(Self::External),
        }
    }
}

/// Reference to the package a dependency points at
#[derive(Debug, Clone)]
pub enum PackageRef {
    /// Resolved through the package lookup
    Name(String),
    /// Already-constructed package, used as-is
    Embedded(Arc<PackageSpec>),
}

impl PackageRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Embedded(spec) => spec.name(),
        }
    }
}

impl PartialEq for PackageRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for PackageRef {}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub target: PackageRef,
    pub kind: DepKind,
}

impl Dependency {
    #[must_use]
    pub fn new(target: PackageRef, kind: DepKind) -> Self {
        Self { target, kind }
    }

    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(PackageRef::Name(name.into()), DepKind::Required)
    }

    #[must_use]
    pub fn with_kind(name: impl Into<String>, kind: DepKind) -> Self {
        Self::new(PackageRef::Name(name.into()), kind)
    }

    #[must_use]
    pub fn external(name: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self::new(PackageRef::Name(name.into()), DepKind::External(ecosystem))
    }

    #[must_use]
    pub fn embedded(spec: Arc<PackageSpec>) -> Self {
        Self::new(PackageRef::Embedded(spec), DepKind::Required)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.target.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dep_kind_parsing() {
        assert_eq!("build".parse::<DepKind>().unwrap(), DepKind::Build);
        assert_eq!(
            "python".parse::<DepKind>().unwrap(),
            DepKind::External(Ecosystem::Python)
        );
        assert!("cobol".parse::<DepKind>().is_err());
    }

    #[test]
    fn test_dependency_constructors() {
        let dep = Dependency::external("numpy", Ecosystem::Python);
        assert_eq!(dep.name(), "numpy");
        assert!(dep.kind.is_external());
        assert_eq!(Dependency::required("zlib").kind, DepKind::Required);
    }
}
