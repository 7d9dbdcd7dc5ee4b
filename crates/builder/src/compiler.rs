//! Compiler compatibility resolution
//!
//! A package may declare that it does not build with the flagged compiler
//! (LLVM-GCC). Depending on how recent the declaration is and what the host
//! toolchain offers, the build either keeps the active compiler, switches to
//! another one, or continues with an advisory.

use crate::BuildEnvironment;
use cellar_config::Config;
use cellar_events::{AppEvent, BuildEvent, EventEmitter};
use cellar_types::{Compiler, CompilerIncompatibility, ToolchainVersion};

/// Declarations at or above this flagged-compiler build force a switch
const FORCED_SWITCH_BUILD: u32 = 2336;

/// Toolchains below this version still ship GCC 4.2
const GCC_TOOLCHAIN_CUTOFF: &str = "4.2";

/// What the host offers to compile with
#[derive(Debug, Clone, Default)]
pub struct HostToolchain {
    pub version: Option<ToolchainVersion>,
    /// Build number of the host's flagged compiler
    pub compiler_build: Option<u32>,
}

impl HostToolchain {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            version: config.toolchain_version(),
            compiler_build: config.toolchain.compiler_build,
        }
    }

    /// Unknown toolchains are treated as recent
    fn predates_clang(&self) -> bool {
        self.version
            .as_ref()
            .is_some_and(|version| *version < ToolchainVersion::parse(GCC_TOOLCHAIN_CUTOFF))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerDecision {
    Keep,
    Switch {
        to: Compiler,
        reason: String,
    },
    /// Keep the compiler but tell the user how to override it
    Advise {
        compiler: Compiler,
        reason: String,
        override_flag: &'static str,
    },
}

/// Decide which compiler a build should use.
#[must_use]
pub fn resolve(
    active: Compiler,
    incompatibility: Option<&CompilerIncompatibility>,
    host: &HostToolchain,
) -> CompilerDecision {
    let Some(fails) = incompatibility.filter(|fails| applies(fails, host)) else {
        return CompilerDecision::Keep;
    };
    if active != fails.compiler {
        return CompilerDecision::Keep;
    }

    let old_toolchain = host.predates_clang();
    if fails.build.is_some_and(|build| build >= FORCED_SWITCH_BUILD) {
        let to = if old_toolchain {
            Compiler::Gcc
        } else {
            Compiler::Clang
        };
        return CompilerDecision::Switch {
            to,
            reason: fails.reason(),
        };
    }

    CompilerDecision::Advise {
        compiler: active,
        reason: fails.reason(),
        override_flag: if old_toolchain {
            "--use-gcc"
        } else {
            "--use-clang"
        },
    }
}

/// A declaration stops applying once the host compiler is newer than the tested build
fn applies(fails: &CompilerIncompatibility, host: &HostToolchain) -> bool {
    match (fails.build, host.compiler_build) {
        (Some(tested), Some(installed)) => installed <= tested,
        _ => true,
    }
}

impl BuildEnvironment {
    /// Act on a compiler decision, switching `CC`/`CXX` when required
    pub fn apply_compiler_decision(&mut self, decision: &CompilerDecision) {
        match decision {
            CompilerDecision::Keep => {}
            CompilerDecision::Switch { to, reason } => {
                let from = self.compiler;
                self.use_compiler(*to);
                self.emit(AppEvent::Build(BuildEvent::CompilerSwitched {
                    package: self.context.name.clone(),
                    from,
                    to: *to,
                    reason: reason.clone(),
                }));
            }
            CompilerDecision::Advise {
                compiler,
                reason,
                override_flag,
            } => {
                self.emit(AppEvent::Build(BuildEvent::CompilerAdvisory {
                    package: self.context.name.clone(),
                    compiler: *compiler,
                    reason: reason.clone(),
                    override_flag: (*override_flag).to_string(),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn host(version: Option<&str>, build: Option<u32>) -> HostToolchain {
        HostToolchain {
            version: version.map(ToolchainVersion::parse),
            compiler_build: build,
        }
    }

    fn fails_with(build: Option<u32>) -> CompilerIncompatibility {
        let fails = CompilerIncompatibility::llvm(Some("Segfaults during linking"), BTreeMap::new());
        match build {
            Some(build) => fails.with_build(build),
            None => fails,
        }
    }

    #[test]
    fn test_no_declaration_keeps_compiler() {
        let decision = resolve(Compiler::Llvm, None, &host(Some("4.3"), Some(2336)));
        assert_eq!(decision, CompilerDecision::Keep);
    }

    #[test]
    fn test_other_active_compiler_is_kept() {
        let fails = fails_with(Some(2336));
        let decision = resolve(Compiler::Gcc, Some(&fails), &host(Some("4.0"), None));
        assert_eq!(decision, CompilerDecision::Keep);
    }

    #[test]
    fn test_newer_host_build_makes_declaration_stale() {
        let fails = fails_with(Some(2335));
        let decision = resolve(Compiler::Llvm, Some(&fails), &host(Some("4.3"), Some(2336)));
        assert_eq!(decision, CompilerDecision::Keep);
    }

    #[test]
    fn test_recent_declaration_switches_by_toolchain() {
        let fails = fails_with(Some(2336));

        match resolve(Compiler::Llvm, Some(&fails), &host(Some("4.1"), Some(2336))) {
            CompilerDecision::Switch { to, reason } => {
                assert_eq!(to, Compiler::Gcc);
                assert!(reason.contains("Tested with LLVM build 2336"));
            }
            other => panic!("expected switch, got {other:?}"),
        }

        match resolve(Compiler::Llvm, Some(&fails), &host(Some("4.2"), None)) {
            CompilerDecision::Switch { to, .. } => assert_eq!(to, Compiler::Clang),
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_toolchain_counts_as_recent() {
        let fails = fails_with(Some(2400));
        match resolve(Compiler::Llvm, Some(&fails), &host(None, None)) {
            CompilerDecision::Switch { to, .. } => assert_eq!(to, Compiler::Clang),
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn test_old_declaration_advises() {
        let fails = fails_with(Some(2335));
        assert_eq!(
            resolve(Compiler::Llvm, Some(&fails), &host(Some("4.0.1"), Some(2335))),
            CompilerDecision::Advise {
                compiler: Compiler::Llvm,
                reason: fails.reason(),
                override_flag: "--use-gcc",
            }
        );

        let unbuilt = fails_with(None);
        match resolve(Compiler::Llvm, Some(&unbuilt), &host(Some("4.3.2"), Some(9999))) {
            CompilerDecision::Advise { override_flag, .. } => {
                assert_eq!(override_flag, "--use-clang");
            }
            other => panic!("expected advisory, got {other:?}"),
        }
    }
}
