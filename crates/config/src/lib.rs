#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for cellar
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/cellar/config.toml)
//! - Environment variables

pub mod constants;
pub mod sections;

pub use sections::{BuildConfig, GeneralConfig, PathConfig, ToolchainConfig};

use cellar_errors::{ConfigError, Error};
use cellar_types::ToolchainVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Engine configuration, one table per section in `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

impl Config {
    /// `<config dir>/cellar/config.toml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the platform has no config directory.
    pub fn default_path() -> Result<PathBuf, Error> {
        dirs::config_dir()
            .map(|dir| dir.join(constants::CONFIG_DIR).join(constants::CONFIG_FILE))
            .ok_or_else(|| {
                ConfigError::NotFound {
                    path: "platform config directory".to_string(),
                }
                .into()
            })
    }

    /// Parse a config file. Missing sections and keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file cannot be read and
    /// `ConfigError::ParseError` for invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into())
            }
            Err(e) => return Err(Error::io_with_path(&e, path)),
        };

        tracing::debug!(path = %path.display(), "loading configuration");
        let config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: format!("{}: {e}", path.display()),
        })?;
        Ok(config)
    }

    /// Load the user's config file, or defaults if there is none
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self, Error> {
        let path = Self::default_path()?;
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from_file(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicit config file if given, else the user's one
    ///
    /// # Errors
    ///
    /// Same as [`Config::load_from_file`] and [`Config::load`].
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => Self::load().await,
        }
    }

    /// Apply `CELLAR_*` environment overrides on top of the loaded values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending variable.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(verbose) = std::env::var("CELLAR_VERBOSE") {
            self.general.verbose = parse_flag("CELLAR_VERBOSE", verbose)?;
        }

        if let Ok(debug) = std::env::var("CELLAR_DEBUG") {
            self.general.debug = parse_flag("CELLAR_DEBUG", debug)?;
        }

        if let Ok(prefix) = std::env::var("CELLAR_PREFIX") {
            self.paths.prefix = parse_path("CELLAR_PREFIX", prefix)?;
        }

        if let Ok(logs) = std::env::var("CELLAR_LOG_DIR") {
            self.paths.logs = Some(parse_path("CELLAR_LOG_DIR", logs)?);
        }

        if let Ok(cache) = std::env::var("CELLAR_CACHE") {
            self.paths.cache = Some(parse_path("CELLAR_CACHE", cache)?);
        }

        if let Ok(compiler) = std::env::var("CELLAR_COMPILER") {
            self.toolchain.compiler =
                compiler.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "CELLAR_COMPILER".to_string(),
                    value: compiler,
                })?;
        }

        Ok(())
    }

    /// Install prefix
    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.paths.prefix
    }

    /// Keg root (with default)
    #[must_use]
    pub fn cellar_path(&self) -> PathBuf {
        self.paths
            .cellar
            .clone()
            .unwrap_or_else(|| self.paths.prefix.join(constants::CELLAR_DIR))
    }

    /// Download cache (with default)
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.paths.cache.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::CACHE_DIR)
        })
    }

    /// Per-user log directory (with default)
    #[must_use]
    pub fn logs_path(&self) -> PathBuf {
        self.paths.logs.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::LOGS_DIR)
        })
    }

    /// Parent directory for build scratch space (with default)
    #[must_use]
    pub fn build_root(&self) -> PathBuf {
        self.paths
            .build_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Operator shell for interactive recovery
    #[must_use]
    pub fn shell(&self) -> String {
        self.build
            .shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| constants::FALLBACK_SHELL.to_string())
    }

    /// Parsed host toolchain version, if configured
    #[must_use]
    pub fn toolchain_version(&self) -> Option<ToolchainVersion> {
        self.toolchain.version.as_deref().map(ToolchainVersion::parse)
    }
}

fn parse_flag(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

fn parse_path(field: &str, value: String) -> Result<PathBuf, Error> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into());
    }
    Ok(PathBuf::from(value))
}
