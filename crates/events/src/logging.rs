//! Bridge from domain events to `tracing`
//!
//! Library crates only emit events. Whoever owns the receiver decides how they
//! are rendered; `forward_to_tracing` is the default sink.

use crate::{AppEvent, EventReceiver};
use tracing::Level;

// Callsite metadata is static, so both level and target have to be literal per arm.
macro_rules! log_at {
    ($level:expr, $target:literal, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!(target: $target, $($rest)+),
            Level::WARN => tracing::warn!(target: $target, $($rest)+),
            Level::INFO => tracing::info!(target: $target, $($rest)+),
            Level::DEBUG => tracing::debug!(target: $target, $($rest)+),
            _ => tracing::trace!(target: $target, $($rest)+),
        }
    };
}

/// Log a single event at its own level and target
pub fn log_event(event: &AppEvent) {
    let level = event.log_level();
    let source = event.event_source().as_str();
    let message = event.message();

    match event {
        AppEvent::General(_) => {
            log_at!(level, "cellar::events::general", source, "{message}");
        }
        AppEvent::Acquisition(_) => {
            log_at!(level, "cellar::events::acquisition", source, "{message}");
        }
        AppEvent::Patch(_) => {
            log_at!(level, "cellar::events::patch", source, "{message}");
        }
        AppEvent::Build(_) => {
            log_at!(level, "cellar::events::build", source, "{message}");
        }
        AppEvent::Resolver(_) => {
            log_at!(level, "cellar::events::resolver", source, "{message}");
        }
    }
}

/// Drain a receiver into `tracing` until every sender is dropped.
///
/// Returns the number of events forwarded.
pub async fn forward_to_tracing(mut receiver: EventReceiver) -> usize {
    let mut forwarded = 0;
    while let Some(event) = receiver.recv().await {
        log_event(&event);
        forwarded += 1;
    }
    forwarded
}
