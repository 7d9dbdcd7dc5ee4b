//! Core `BuildEnvironment` struct and construction

use crate::BuildContext;
use cellar_events::{EventEmitter, EventSender};
use cellar_types::Compiler;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Build environment for a single package build
#[derive(Clone, Debug)]
pub struct BuildEnvironment {
    /// Build context
    pub(crate) context: BuildContext,
    /// Directory commands run in
    pub(crate) working_dir: PathBuf,
    /// Global install prefix substituted into embedded patches, not the keg
    pub(crate) install_prefix: PathBuf,
    /// Environment variables applied on top of the inherited environment
    pub(crate) env_vars: HashMap<String, String>,
    /// Inherit stdio instead of capturing output
    pub(crate) verbose: bool,
    pub(crate) compiler: Compiler,
    pub(crate) patch_tool: String,
}

impl BuildEnvironment {
    /// Create new build environment
    #[must_use]
    pub fn new(context: BuildContext, working_dir: &Path, install_prefix: &Path) -> Self {
        Self {
            context,
            working_dir: working_dir.to_path_buf(),
            install_prefix: install_prefix.to_path_buf(),
            env_vars: HashMap::new(),
            verbose: false,
            compiler: Compiler::default(),
            patch_tool: "patch".to_string(),
        }
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Start from a compiler selection; sets `CC` and `CXX`
    #[must_use]
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.use_compiler(compiler);
        self
    }

    #[must_use]
    pub fn with_patch_tool(mut self, patch_tool: impl Into<String>) -> Self {
        self.patch_tool = patch_tool.into();
        self
    }

    /// Get build context
    #[must_use]
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = dir.into();
    }

    #[must_use]
    pub fn install_prefix(&self) -> &Path {
        &self.install_prefix
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn compiler(&self) -> Compiler {
        self.compiler
    }

    #[must_use]
    pub fn patch_tool(&self) -> &str {
        &self.patch_tool
    }

    /// Get environment variables
    #[must_use]
    pub fn env_vars(&self) -> &HashMap<String, String> {
        &self.env_vars
    }

    /// Set environment variable
    pub fn set_env_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_vars.insert(key.into(), value.into());
    }

    /// Remove an override, returning its previous value
    pub fn remove_env_var(&mut self, key: &str) -> Option<String> {
        self.env_vars.remove(key)
    }

    /// Get package name
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.context.name
    }

    pub(crate) fn use_compiler(&mut self, compiler: Compiler) {
        let (cc, cxx) = compiler.executables();
        self.env_vars.insert("CC".to_string(), cc.to_string());
        self.env_vars.insert("CXX".to_string(), cxx.to_string());
        self.compiler = compiler;
    }
}

impl EventEmitter for BuildEnvironment {
    fn event_sender(&self) -> Option<&EventSender> {
        self.context.event_sender()
    }
}
