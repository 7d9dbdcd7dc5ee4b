#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in cellar
//!
//! Components never print. Everything the engine has to say (announcements,
//! captured command output, warnings, fault traces) goes out as an `AppEvent`
//! through an `EventEmitter`. Events are grouped by domain and carry their own
//! tracing level and target, so the receiving side can forward them straight
//! into `tracing`.

mod meta;
pub use meta::EventSource;

pub mod events;
pub use events::{
    AcquisitionEvent, AppEvent, BuildEvent, BuildState, FailureContext, GeneralEvent, PatchEvent,
    ResolverEvent,
};

mod logging;
pub use logging::{forward_to_tracing, log_event};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type EventSender = UnboundedSender<AppEvent>;

pub type EventReceiver = UnboundedReceiver<AppEvent>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Anything that may carry an event sender
///
/// Implemented by the raw `EventSender` and by context structs that hold an
/// optional one. Without a sender, events are dropped.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // A closed receiver only means nobody is listening
            let _ = sender.send(event);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Debug {
            message: message.into(),
        }));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message, None)));
    }

    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(
            message,
            Some(context.into()),
        )));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message, None)));
    }

    /// Announce a build state transition
    fn emit_phase(&self, package: impl Into<String>, phase: BuildState) {
        self.emit(AppEvent::Build(BuildEvent::PhaseStarted {
            package: package.into(),
            phase,
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
