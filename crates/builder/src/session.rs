//! Single-package build session
//!
//! `Brewer::brew` drives a package from an unstaged source to an installed
//! keg: resolve the compiler, fetch and verify the source, stage it into a
//! scratch directory, patch it, then hand over to the package's
//! `BuildProcedure`. Failures either preserve diagnostics and propagate or, in
//! debug mode, open an operator session in the build directory.

use crate::compiler::{self, HostToolchain};
use crate::environment::{BuildCommandResult, BuildEnvironment};
use crate::operator::{InteractiveShell, OperatorSession};
use crate::patch::{PatchEngine, PatchPlan};
use crate::BuildContext;
use async_trait::async_trait;
use cellar_config::Config;
use cellar_errors::{BuildError, Error};
use cellar_events::{AppEvent, BuildEvent, BuildState, EventEmitter, EventSender, FailureContext};
use cellar_net::{BatchDownloader, CurlBatchDownloader, FetchCoordinator};
use cellar_types::{Keg, PackageSpec, PatchDeclaration};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Build logs worth keeping when a build fails
const DIAGNOSTIC_FILES: &[&str] = &["config.log", "CMakeCache.txt"];

/// Package-specific build steps
#[async_trait]
pub trait BuildProcedure: Send + Sync {
    /// Patches to apply before installing. Called once per build.
    fn patches(&self, spec: &PackageSpec) -> PatchDeclaration {
        spec.patches().clone()
    }

    /// Configure, compile and install into `session.prefix()`.
    ///
    /// # Errors
    ///
    /// Any error aborts the build.
    async fn install(&self, session: &mut BuildSession<'_>) -> Result<(), Error>;
}

/// State handed to a `BuildProcedure`
pub struct BuildSession<'a> {
    spec: &'a PackageSpec,
    env: BuildEnvironment,
    keg: Keg,
    buildpath: Option<PathBuf>,
}

impl<'a> BuildSession<'a> {
    #[must_use]
    pub fn new(spec: &'a PackageSpec, env: BuildEnvironment, keg: Keg) -> Self {
        Self {
            spec,
            env,
            keg,
            buildpath: None,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &PackageSpec {
        self.spec
    }

    #[must_use]
    pub fn env(&self) -> &BuildEnvironment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut BuildEnvironment {
        &mut self.env
    }

    #[must_use]
    pub fn keg(&self) -> &Keg {
        &self.keg
    }

    /// Install prefix for this build
    #[must_use]
    pub fn prefix(&self) -> &Path {
        self.keg.prefix()
    }

    /// Staged source directory, set while the build is in progress
    #[must_use]
    pub fn buildpath(&self) -> Option<&Path> {
        self.buildpath.as_deref()
    }

    /// Run a build command in the staged source directory
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CommandFailed` on a non-zero exit.
    pub async fn system(&mut self, cmd: &str, args: &[&str]) -> Result<BuildCommandResult, Error> {
        self.env.system(cmd, args).await
    }

    /// Standard `cmake` arguments for this keg
    #[must_use]
    pub fn std_cmake_parameters(&self) -> Vec<String> {
        PackageSpec::std_cmake_parameters(self.prefix())
    }

    fn enter(&self, phase: BuildState) {
        self.env.emit_phase(self.spec.name(), phase);
    }
}

/// How a build ended when it did not fail outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrewOutcome {
    Succeeded { prefix: PathBuf },
    /// Debug build failed and the operator session has ended.
    ///
    /// Whether anything was installed is for the caller to check.
    Recovered { shell_status: Option<i32> },
}

/// Builds packages from source
pub struct Brewer {
    config: Config,
    fetcher: FetchCoordinator,
    downloader: Arc<dyn BatchDownloader>,
    operator: Arc<dyn OperatorSession>,
    event_sender: Option<EventSender>,
}

impl Brewer {
    /// Create a brewer using curl for patch downloads and the configured shell for recovery
    #[must_use]
    pub fn new(config: Config, fetcher: FetchCoordinator) -> Self {
        let downloader = Arc::new(CurlBatchDownloader::new(
            config.build.curl.clone(),
            config.build.user_agent.clone(),
        ));
        let operator = Arc::new(InteractiveShell::new(config.shell()));
        Self {
            config,
            fetcher,
            downloader,
            operator,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_downloader(mut self, downloader: Arc<dyn BatchDownloader>) -> Self {
        self.downloader = downloader;
        self
    }

    #[must_use]
    pub fn with_operator(mut self, operator: Arc<dyn OperatorSession>) -> Self {
        self.operator = operator;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build and install a single package.
    ///
    /// The scratch directory is removed when this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns validation, fetch and checksum errors before anything is
    /// staged. Patch and install failures are returned after diagnostics are
    /// preserved, unless debug mode turns them into `BrewOutcome::Recovered`.
    pub async fn brew(
        &self,
        spec: &PackageSpec,
        procedure: &dyn BuildProcedure,
    ) -> Result<BrewOutcome, Error> {
        spec.validate()?;

        let context = BuildContext::for_package(spec).with_event_sender(self.event_sender.clone());
        context.emit(AppEvent::Build(BuildEvent::SessionStarted {
            package: spec.name().to_string(),
            version: spec.version().clone(),
        }));
        context.emit_phase(spec.name(), BuildState::Unstaged);

        let keg = spec.keg(&self.config.cellar_path());
        let build_root = self.config.build_root();
        let mut env = BuildEnvironment::new(context, &build_root, self.config.prefix())
            .with_verbose(self.config.general.verbose)
            .with_compiler(self.config.toolchain.compiler)
            .with_patch_tool(self.config.build.patch_tool.clone());

        let decision = compiler::resolve(
            env.compiler(),
            spec.fails_with(),
            &HostToolchain::from_config(&self.config),
        );
        env.apply_compiler_decision(&decision);

        let fetched = self.fetcher.fetch(spec, &env).await?;

        fs::create_dir_all(&build_root)
            .await
            .map_err(|e| Error::io_with_path(&e, &build_root))?;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}-", spec.name()))
            .tempdir_in(&build_root)
            .map_err(|e| Error::io_with_path(&e, &build_root))?;

        fetched.strategy.stage(scratch.path()).await?;
        env.set_working_dir(scratch.path());

        let mut session = BuildSession::new(spec, env, keg);
        session.buildpath = Some(scratch.path().to_path_buf());
        session.enter(BuildState::Staged);

        let outcome = match self.patch_and_install(&mut session, procedure).await {
            Ok(()) => {
                session.buildpath = None;
                session.enter(BuildState::Succeeded);
                session.env.emit(AppEvent::Build(BuildEvent::Completed {
                    package: spec.name().to_string(),
                    version: spec.version().clone(),
                    prefix: session.prefix().to_path_buf(),
                }));
                Ok(BrewOutcome::Succeeded {
                    prefix: session.prefix().to_path_buf(),
                })
            }
            Err(error) if self.config.general.debug => {
                self.recover(&session, &error).await
            }
            Err(error) => {
                session.enter(BuildState::Failed);
                self.preserve_diagnostics(&session).await;
                Err(error)
            }
        };

        drop(scratch);
        outcome
    }

    async fn patch_and_install(
        &self,
        session: &mut BuildSession<'_>,
        procedure: &dyn BuildProcedure,
    ) -> Result<(), Error> {
        let declaration = procedure.patches(session.spec);
        let plan = PatchPlan::from_declaration(&declaration)?;
        PatchEngine::new(self.downloader.as_ref())
            .apply(&plan, &session.env)
            .await?;
        session.enter(BuildState::Patched);

        session.enter(BuildState::Building);
        tokio::select! {
            result = procedure.install(session) => result,
            () = interrupted() => Err(Error::Cancelled),
        }
    }

    /// Copy build logs out of the scratch directory before it is removed
    async fn preserve_diagnostics(&self, session: &BuildSession<'_>) {
        let source = session.env.working_dir();
        let destination = self.config.logs_path().join(session.spec.name());
        let mut files = Vec::new();

        for name in DIAGNOSTIC_FILES {
            let from = source.join(name);
            if !from.is_file() {
                continue;
            }
            if let Err(e) = fs::create_dir_all(&destination).await {
                session.env.emit_warning_with_context(
                    format!("could not create {}", destination.display()),
                    e.to_string(),
                );
                return;
            }
            let to = destination.join(name);
            match fs::copy(&from, &to).await {
                Ok(_) => files.push(to),
                Err(e) => session.env.emit_warning_with_context(
                    format!("could not preserve {}", from.display()),
                    e.to_string(),
                ),
            }
        }

        if !files.is_empty() {
            session
                .env
                .emit(AppEvent::Build(BuildEvent::DiagnosticsPreserved {
                    package: session.spec.name().to_string(),
                    files,
                    destination,
                }));
        }
    }

    /// Report the failure and let the operator take over the build directory
    async fn recover(
        &self,
        session: &BuildSession<'_>,
        error: &Error,
    ) -> Result<BrewOutcome, Error> {
        let package = session.spec.name().to_string();
        let working_dir = session.env.working_dir().to_path_buf();
        session.enter(BuildState::Recovering);

        session.env.emit(AppEvent::Build(BuildEvent::Failed {
            package: package.clone(),
            failure: FailureContext::from_error(error),
            trace: source_chain(error),
        }));

        let config_log = working_dir.join("config.log");
        if error.as_build().is_some_and(BuildError::was_running_configure) && config_log.is_file() {
            session.env.emit(AppEvent::Build(BuildEvent::ConfigureHint {
                package: package.clone(),
                log: config_log,
            }));
        }

        session.env.emit(AppEvent::Build(BuildEvent::RecoveryStarted {
            package: package.clone(),
            prefix: session.prefix().to_path_buf(),
            working_dir: working_dir.clone(),
        }));

        let shell_status = self.operator.run(&working_dir, &session.env).await?;
        session.env.emit(AppEvent::Build(BuildEvent::RecoveryFinished {
            package,
            shell_status,
        }));

        Ok(BrewOutcome::Recovered { shell_status })
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn source_chain(error: &Error) -> Vec<String> {
    let mut trace = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        trace.push(cause.to_string());
        source = cause.source();
    }
    if let Some(output) = error.as_build().and_then(BuildError::captured_output) {
        trace.extend(output.lines().map(str::to_string));
    }
    trace
}
