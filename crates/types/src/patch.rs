//! Patch declarations as written in a package definition

use serde::{Deserialize, Serialize};
use std::fmt;

/// Argument to `patch -p<N>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StripLevel(pub u8);

impl StripLevel {
    pub const P0: Self = Self(0);
    pub const P1: Self = Self(1);
    pub const P2: Self = Self(2);
}

impl Default for StripLevel {
    fn default() -> Self {
        Self::P1
    }
}

impl fmt::Display for StripLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Where a single patch comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchSource {
    /// Diff text shipped inside the package definition
    Embedded(String),
    /// A URL (`scheme://...`) or a path relative to the build directory
    Location(String),
}

impl PatchSource {
    #[must_use]
    pub fn location(value: impl Into<String>) -> Self {
        Self::Location(value.into())
    }
}

/// The `patches` section of a package definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchDeclaration {
    #[default]
    None,
    /// Applied with `-p1`
    List(Vec<PatchSource>),
    /// Strip level to sources, in declaration order
    ByStrip(Vec<(StripLevel, Vec<PatchSource>)>),
}

impl PatchDeclaration {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::List(sources) => sources.is_empty(),
            Self::ByStrip(levels) => levels.iter().all(|(_, sources)| sources.is_empty()),
        }
    }

    /// Normalise to strip level groups; a bare list becomes a single `p1` group.
    #[must_use]
    pub fn by_strip_level(&self) -> Vec<(StripLevel, Vec<PatchSource>)> {
        match self {
            Self::None => Vec::new(),
            Self::List(sources) => vec![(StripLevel::P1, sources.clone())],
            Self::ByStrip(levels) => levels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_list_defaults_to_p1() {
        let decl = PatchDeclaration::List(vec![PatchSource::location("fix.diff")]);
        let groups = decl.by_strip_level();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, StripLevel::P1);
        assert_eq!(groups[0].0.to_string(), "p1");
    }

    #[test]
    fn test_empty_declarations() {
        assert!(PatchDeclaration::None.is_empty());
        assert!(PatchDeclaration::List(vec![]).is_empty());
        assert!(PatchDeclaration::ByStrip(vec![(StripLevel::P0, vec![])]).is_empty());
    }
}
