//! Configuration sections

use crate::constants;
use cellar_types::Compiler;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General behaviour flags
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    /// Inherit subprocess stdio and show every command argument
    #[serde(default)]
    pub verbose: bool,
    /// Drop into an operator shell when a build fails
    #[serde(default)]
    pub debug: bool,
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Install prefix, substituted into embedded patches
    #[serde(default = "default_prefix")]
    pub prefix: PathBuf,
    /// Keg root; `<prefix>/Cellar` when unset
    pub cellar: Option<PathBuf>,
    pub cache: Option<PathBuf>,
    /// Per-user directory that keeps logs of failed builds
    pub logs: Option<PathBuf>,
    /// Parent of per-build scratch directories; system temp when unset
    pub build_root: Option<PathBuf>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            cellar: None,
            cache: None,
            logs: None,
            build_root: None,
        }
    }
}

/// External tools used during a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_patch_tool")]
    pub patch_tool: String,
    #[serde(default = "default_curl")]
    pub curl: String,
    /// Operator shell for interactive recovery; `$SHELL` when unset
    pub shell: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            patch_tool: default_patch_tool(),
            curl: default_curl(),
            shell: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Host compiler toolchain
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolchainConfig {
    #[serde(default)]
    pub compiler: Compiler,
    /// Host toolchain release, e.g. `4.3`
    pub version: Option<String>,
    /// Build number of the host's LLVM compiler
    pub compiler_build: Option<u32>,
}

fn default_prefix() -> PathBuf {
    PathBuf::from(constants::DEFAULT_PREFIX)
}

fn default_patch_tool() -> String {
    constants::PATCH_TOOL.to_string()
}

fn default_curl() -> String {
    constants::CURL.to_string()
}

fn default_user_agent() -> String {
    constants::USER_AGENT.to_string()
}
