use serde::{Deserialize, Serialize};

/// Dependency graph expansion events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolverEvent {
    ExpansionStarted { package: String },

    /// Flattened, de-duplicated closure in install order
    ExpansionCompleted {
        package: String,
        dependencies: Vec<String>,
    },

    CycleDetected { chain: Vec<String> },
}

impl ResolverEvent {
    pub(crate) fn message(&self) -> String {
        match self {
            Self::ExpansionStarted { package } => format!("Expanding dependencies of {package}"),
            Self::ExpansionCompleted {
                package,
                dependencies,
            } => {
                if dependencies.is_empty() {
                    format!("{package} has no dependencies")
                } else {
                    format!("{package} depends on {}", dependencies.join(", "))
                }
            }
            Self::CycleDetected { chain } => {
                format!("Cyclic dependency: {}", chain.join(" -> "))
            }
        }
    }
}
