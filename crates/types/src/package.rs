//! The package data model handed to the build engine

use crate::{
    Checksum, CompilerIncompatibility, Dependency, Ecosystem, PatchDeclaration, SoftwareSpec,
    SpecRequest, SpecVariant, Version,
};
use cellar_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// A URL plus the options passed to its download strategy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceDeclaration {
    pub url: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl SourceDeclaration {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn into_spec(self, variant: SpecVariant) -> SoftwareSpec {
        SoftwareSpec {
            url: self.url,
            options: self.options,
            variant,
        }
    }
}

/// Development release declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DevelDeclaration {
    #[serde(flatten)]
    pub source: SourceDeclaration,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub checksum: Option<Checksum>,
}

/// Why a package is not linked into the prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KegOnlyReason {
    pub reason: String,
    #[serde(default)]
    pub explanation: String,
}

impl fmt::Display for KegOnlyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explanation.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}\n\n{}", self.reason, self.explanation)
        }
    }
}

/// Paths the post-install cleaner must leave alone
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SkipClean {
    #[default]
    None,
    All,
    /// Paths relative to the keg prefix
    Paths(BTreeSet<String>),
}

/// Prebuilt binary archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottle {
    pub url: String,
    pub sha1: String,
}

/// Everything the front end assembled from a package definition
#[derive(Debug, Clone, Default)]
pub struct PackageDefinition {
    pub name: String,
    pub homepage: Option<String>,
    pub stable: Option<SourceDeclaration>,
    /// Explicit stable version; detected from the URL when absent
    pub version: Option<String>,
    pub checksum: Option<Checksum>,
    pub mirrors: Vec<SourceDeclaration>,
    pub devel: Option<DevelDeclaration>,
    pub head: Option<SourceDeclaration>,
    pub dependencies: Vec<Dependency>,
    pub patches: PatchDeclaration,
    pub fails_with: Option<CompilerIncompatibility>,
    pub keg_only: Option<KegOnlyReason>,
    pub skip_clean: SkipClean,
    pub bottle: Option<Bottle>,
}

impl PackageDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.stable = Some(SourceDeclaration::new(url));
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    #[must_use]
    pub fn with_mirror(mut self, url: impl Into<String>) -> Self {
        self.mirrors.push(SourceDeclaration::new(url));
        self
    }

    #[must_use]
    pub fn with_head(mut self, url: impl Into<String>) -> Self {
        self.head = Some(SourceDeclaration::new(url));
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    #[must_use]
    pub fn with_patches(mut self, patches: PatchDeclaration) -> Self {
        self.patches = patches;
        self
    }

    #[must_use]
    pub fn with_fails_with(mut self, incompatibility: CompilerIncompatibility) -> Self {
        self.fails_with = Some(incompatibility);
        self
    }
}

/// A fully resolved, immutable package
#[derive(Debug, Clone)]
pub struct PackageSpec {
    name: String,
    version: Version,
    homepage: Option<String>,
    active: SoftwareSpec,
    stable: Option<SoftwareSpec>,
    head: Option<SoftwareSpec>,
    mirrors: Vec<SoftwareSpec>,
    checksum: Option<Checksum>,
    dependencies: Vec<Dependency>,
    patches: PatchDeclaration,
    fails_with: Option<CompilerIncompatibility>,
    keg_only: Option<KegOnlyReason>,
    skip_clean: SkipClean,
    bottle: Option<Bottle>,
}

impl PackageSpec {
    /// Resolve a definition into a package for the requested variant.
    ///
    /// Head is chosen when it is declared and either requested or the only
    /// source. Devel is chosen when requested and declared. Head and devel
    /// builds never use mirrors; head builds carry no checksum.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::MissingField` when no URL or version is available
    /// and `PackageError::InvalidField` when the name or version is empty or
    /// contains whitespace.
    pub fn from_definition(
        def: PackageDefinition,
        request: SpecRequest,
    ) -> Result<Self, PackageError> {
        validate_name(&def.name)?;

        let stable = def
            .stable
            .clone()
            .map(|source| source.into_spec(SpecVariant::Stable));
        let head = def
            .head
            .clone()
            .map(|source| source.into_spec(SpecVariant::Head));

        let use_head = head.is_some() && (stable.is_none() || request == SpecRequest::Head);
        let use_devel = !use_head && request == SpecRequest::Devel && def.devel.is_some();

        let (active, version, checksum, mirrors) = if use_head {
            let active = head.clone().ok_or_else(|| missing(&def.name, "head"))?;
            (active, Version::head(), None, Vec::new())
        } else if use_devel {
            let devel = def.devel.clone().ok_or_else(|| missing(&def.name, "devel"))?;
            let active = devel.source.into_spec(SpecVariant::Devel);
            let version = resolve_version(&def.name, devel.version, &active)?;
            (active, version, devel.checksum, Vec::new())
        } else {
            let active = stable.clone().ok_or_else(|| missing(&def.name, "url"))?;
            let version = resolve_version(&def.name, def.version.clone(), &active)?;
            let mirrors = def
                .mirrors
                .into_iter()
                .map(|mirror| mirror.into_spec(SpecVariant::Stable))
                .collect();
            (active, version, def.checksum, mirrors)
        };

        Ok(Self {
            name: def.name,
            version,
            homepage: def.homepage,
            active,
            stable,
            head,
            mirrors,
            checksum,
            dependencies: def.dependencies,
            patches: def.patches,
            fails_with: def.fails_with,
            keg_only: def.keg_only,
            skip_clean: def.skip_clean,
            bottle: def.bottle,
        })
    }

    /// Re-check the identifying fields before any fetch or build work.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidField` for an empty or whitespace-bearing
    /// name or version.
    pub fn validate(&self) -> Result<(), PackageError> {
        validate_name(&self.name)?;
        Version::new(self.version.as_str())?;
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    /// The source this instance builds from
    #[must_use]
    pub fn active(&self) -> &SoftwareSpec {
        &self.active
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.active.url
    }

    #[must_use]
    pub fn stable(&self) -> Option<&SoftwareSpec> {
        self.stable.as_ref()
    }

    #[must_use]
    pub fn head(&self) -> Option<&SoftwareSpec> {
        self.head.as_ref()
    }

    #[must_use]
    pub fn is_head(&self) -> bool {
        self.active.variant == SpecVariant::Head
    }

    #[must_use]
    pub fn mirrors(&self) -> &[SoftwareSpec] {
        &self.mirrors
    }

    #[must_use]
    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    /// Dependencies managed by this package manager
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|dep| !dep.kind.is_external())
    }

    /// Foreign-ecosystem dependencies grouped by ecosystem
    #[must_use]
    pub fn external_dependencies(&self) -> BTreeMap<Ecosystem, Vec<String>> {
        let mut grouped: BTreeMap<Ecosystem, Vec<String>> = BTreeMap::new();
        for dep in &self.dependencies {
            if let crate::DepKind::External(ecosystem) = dep.kind {
                grouped
                    .entry(ecosystem)
                    .or_default()
                    .push(dep.name().to_string());
            }
        }
        grouped
    }

    #[must_use]
    pub fn patches(&self) -> &PatchDeclaration {
        &self.patches
    }

    #[must_use]
    pub fn fails_with(&self) -> Option<&CompilerIncompatibility> {
        self.fails_with.as_ref()
    }

    #[must_use]
    pub fn keg_only(&self) -> Option<&KegOnlyReason> {
        self.keg_only.as_ref()
    }

    #[must_use]
    pub fn bottle(&self) -> Option<&Bottle> {
        self.bottle.as_ref()
    }

    /// True when the bottle was built from this exact version
    #[must_use]
    pub fn bottle_up_to_date(&self) -> bool {
        self.bottle
            .as_ref()
            .and_then(|bottle| Version::detect_from_url(&bottle.url))
            .is_some_and(|version| version == self.version)
    }

    /// Whether the cleaner should skip `path`, which lives under `prefix`
    #[must_use]
    pub fn skip_clean(&self, path: &Path, prefix: &Path) -> bool {
        match &self.skip_clean {
            SkipClean::None => false,
            SkipClean::All => true,
            SkipClean::Paths(paths) => path
                .strip_prefix(prefix)
                .is_ok_and(|relative| paths.contains(relative.to_string_lossy().as_ref())),
        }
    }

    /// `<cellar>/<name>`
    #[must_use]
    pub fn rack(&self, cellar: &Path) -> PathBuf {
        cellar.join(&self.name)
    }

    /// `<cellar>/<name>/<version>`
    #[must_use]
    pub fn prefix(&self, cellar: &Path) -> PathBuf {
        self.rack(cellar).join(self.version.as_str())
    }

    /// The keg an existing install lives in, preferring a head install
    #[must_use]
    pub fn installed_prefix(&self, cellar: &Path) -> PathBuf {
        let head_prefix = self.rack(cellar).join(crate::version::HEAD);
        if self.version.is_head() || head_prefix.is_dir() {
            head_prefix
        } else {
            self.prefix(cellar)
        }
    }

    /// True when the installed keg exists and has content
    #[must_use]
    pub fn is_installed(&self, cellar: &Path) -> bool {
        std::fs::read_dir(self.installed_prefix(cellar))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// Layout helpers for the keg this build installs into
    #[must_use]
    pub fn keg(&self, cellar: &Path) -> Keg {
        Keg {
            name: self.name.clone(),
            prefix: self.prefix(cellar),
        }
    }

    /// Standard arguments for a CMake configure step
    #[must_use]
    pub fn std_cmake_parameters(prefix: &Path) -> Vec<String> {
        vec![
            format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()),
            "-DCMAKE_BUILD_TYPE=None".to_string(),
            "-Wno-dev".to_string(),
        ]
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Directory layout inside a keg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keg {
    name: String,
    prefix: PathBuf,
}

impl Keg {
    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    #[must_use]
    pub fn bin(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    #[must_use]
    pub fn sbin(&self) -> PathBuf {
        self.prefix.join("sbin")
    }

    #[must_use]
    pub fn lib(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    #[must_use]
    pub fn include(&self) -> PathBuf {
        self.prefix.join("include")
    }

    #[must_use]
    pub fn libexec(&self) -> PathBuf {
        self.prefix.join("libexec")
    }

    #[must_use]
    pub fn share(&self) -> PathBuf {
        self.prefix.join("share")
    }

    #[must_use]
    pub fn man(&self) -> PathBuf {
        self.share().join("man")
    }

    /// `share/man/man<N>`
    #[must_use]
    pub fn man_section(&self, section: u8) -> PathBuf {
        self.man().join(format!("man{section}"))
    }

    #[must_use]
    pub fn doc(&self) -> PathBuf {
        self.share().join("doc").join(&self.name)
    }

    #[must_use]
    pub fn info(&self) -> PathBuf {
        self.share().join("info")
    }
}

fn validate_name(name: &str) -> Result<(), PackageError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(PackageError::invalid("name", name));
    }
    Ok(())
}

fn missing(name: &str, field: &str) -> PackageError {
    PackageError::MissingField {
        name: name.to_string(),
        field: field.to_string(),
    }
}

fn resolve_version(
    name: &str,
    explicit: Option<String>,
    spec: &SoftwareSpec,
) -> Result<Version, PackageError> {
    match explicit {
        Some(version) => Version::new(version),
        None => spec.detect_version().ok_or_else(|| missing(name, "version")),
    }
}
