//! Build context for package building

use cellar_events::{EventEmitter, EventSender};
use cellar_types::{PackageSpec, Version};

/// Identity of the package being built plus the event channel
#[derive(Clone, Debug)]
pub struct BuildContext {
    /// Package name
    pub name: String,
    /// Package version
    pub version: Version,
    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl BuildContext {
    /// Create new build context
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn for_package(spec: &PackageSpec) -> Self {
        Self::new(spec.name(), spec.version().clone())
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: Option<EventSender>) -> Self {
        self.event_sender = event_sender;
        self
    }
}
