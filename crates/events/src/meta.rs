use serde::{Deserialize, Serialize};

/// Pipeline domain an event belongs to
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    General,
    Acquisition,
    Patch,
    Build,
    Resolver,
}

impl EventSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Acquisition => "acquisition",
            Self::Patch => "patch",
            Self::Build => "build",
            Self::Resolver => "resolver",
        }
    }

    /// `tracing` target for events from this domain
    #[must_use]
    pub fn log_target(self) -> &'static str {
        match self {
            Self::General => "cellar::events::general",
            Self::Acquisition => "cellar::events::acquisition",
            Self::Patch => "cellar::events::patch",
            Self::Build => "cellar::events::build",
            Self::Resolver => "cellar::events::resolver",
        }
    }
}
