//! Compiler identities and incompatibility annotations

use cellar_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const NO_REASON: &str = "(No specific reason was given)";

/// C/C++ compiler families the build environment can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    Gcc,
    Llvm,
    #[default]
    Clang,
}

impl Compiler {
    /// `(CC, CXX)` executables for this compiler
    #[must_use]
    pub fn executables(self) -> (&'static str, &'static str) {
        match self {
            Self::Gcc => ("gcc-4.2", "g++-4.2"),
            Self::Llvm => ("llvm-gcc", "llvm-g++"),
            Self::Clang => ("clang", "clang++"),
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcc => write!(f, "gcc"),
            Self::Llvm => write!(f, "llvm"),
            Self::Clang => write!(f, "clang"),
        }
    }
}

impl FromStr for Compiler {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" => Ok(Self::Gcc),
            "llvm" | "llvm-gcc" => Ok(Self::Llvm),
            "clang" => Ok(Self::Clang),
            _ => Err(PackageError::invalid("compiler", s)),
        }
    }
}

/// Declares that a package is known not to build with a compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerIncompatibility {
    pub compiler: Compiler,
    pub message: String,
    pub data: BTreeMap<String, String>,
    /// Highest compiler build known to fail
    pub build: Option<u32>,
}

impl CompilerIncompatibility {
    /// Build an annotation against LLVM; a `build` entry in `data` becomes the build number.
    #[must_use]
    pub fn llvm(message: Option<&str>, mut data: BTreeMap<String, String>) -> Self {
        let build = data.remove("build").and_then(|b| b.trim().parse().ok());
        Self {
            compiler: Compiler::Llvm,
            message: message.map_or_else(|| NO_REASON.to_string(), ToString::to_string),
            data,
            build,
        }
    }

    #[must_use]
    pub fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    /// Human-readable explanation, including the tested build when known
    #[must_use]
    pub fn reason(&self) -> String {
        match self.build {
            Some(build) => format!("{}\nTested with LLVM build {build}\n", self.message),
            None => format!("{}\n", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_extracted_from_data() {
        let data = BTreeMap::from([
            ("build".to_string(), "2326".to_string()),
            ("ticket".to_string(), "123".to_string()),
        ]);
        let record = CompilerIncompatibility::llvm(Some("segfaults in ld"), data);
        assert_eq!(record.build, Some(2326));
        assert_eq!(record.data.len(), 1);
        assert!(record.reason().contains("Tested with LLVM build 2326"));
    }

    #[test]
    fn test_default_message() {
        let record = CompilerIncompatibility::llvm(None, BTreeMap::new());
        assert_eq!(record.reason(), "(No specific reason was given)\n");
    }
}
