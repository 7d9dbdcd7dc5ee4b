use serde::{Deserialize, Serialize};

use crate::EventSource;
use cellar_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod acquisition;
pub mod build;
pub mod general;
pub mod patch;
pub mod resolver;

pub use acquisition::*;
pub use build::*;
pub use general::*;
pub use patch::*;
pub use resolver::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors, debug output and operation lifecycle
    General(GeneralEvent),

    /// Source fetching and integrity checks
    Acquisition(AcquisitionEvent),

    Patch(PatchEvent),

    /// Build sessions, commands, compiler selection and recovery
    Build(BuildEvent),

    Resolver(ResolverEvent),
}

impl AppEvent {
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Acquisition(_) => EventSource::Acquisition,
            Self::Patch(_) => EventSource::Patch,
            Self::Build(_) => EventSource::Build,
            Self::Resolver(_) => EventSource::Resolver,
        }
    }

    /// Level the event is logged at when forwarded to `tracing`
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Acquisition(AcquisitionEvent::Failed { .. })
            | Self::Patch(PatchEvent::Failed { .. })
            | Self::Build(BuildEvent::Failed { .. } | BuildEvent::CommandFailed { .. })
            | Self::Resolver(ResolverEvent::CycleDetected { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Acquisition(
                AcquisitionEvent::MirrorFallback { .. } | AcquisitionEvent::ChecksumMissing { .. },
            )
            | Self::Build(
                BuildEvent::CompilerAdvisory { .. }
                | BuildEvent::ConfigureHint { .. }
                | BuildEvent::CommandOutput { .. },
            ) => Level::WARN,

            Self::General(GeneralEvent::Debug { .. })
            | Self::Acquisition(AcquisitionEvent::ChecksumVerified { .. })
            | Self::Patch(PatchEvent::Decompressed { .. })
            | Self::Build(BuildEvent::PhaseStarted { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    #[must_use]
    pub fn log_target(&self) -> &'static str {
        self.event_source().log_target()
    }

    /// Human-readable rendering of the event
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::General(event) => event.message(),
            Self::Acquisition(event) => event.message(),
            Self::Patch(event) => event.message(),
            Self::Build(event) => event.message(),
            Self::Resolver(event) => event.message(),
        }
    }
}
