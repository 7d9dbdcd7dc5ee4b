//! Default filesystem locations and tool names

pub const DEFAULT_PREFIX: &str = "/usr/local";
pub const CELLAR_DIR: &str = "Cellar";

/// Placed under `dirs::cache_dir()`
pub const CACHE_DIR: &str = "cellar";
/// Placed under `dirs::home_dir()`
pub const LOGS_DIR: &str = "Library/Logs/Cellar";

pub const CONFIG_DIR: &str = "cellar";
pub const CONFIG_FILE: &str = "config.toml";

pub const PATCH_TOOL: &str = "patch";
pub const CURL: &str = "curl";
pub const FALLBACK_SHELL: &str = "/bin/sh";

pub const USER_AGENT: &str = concat!("Cellar/", env!("CARGO_PKG_VERSION"));
