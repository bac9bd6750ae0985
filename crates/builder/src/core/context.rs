//! Per-invocation context shared by every lifecycle stage

use cpkg_events::{AppEvent, BuildEvent, BuildPhase, EventEmitter, EventSender};
use cpkg_types::PackageReference;
use std::time::Duration;

/// Identity of one lifecycle run plus where its events go
#[derive(Clone, Debug)]
pub struct BuildContext {
    /// Unique id tagged onto every event of the run
    pub session_id: String,
    /// Package being built
    pub reference: PackageReference,
    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl BuildContext {
    /// Create a context with a fresh session id
    #[must_use]
    pub fn new(reference: PackageReference) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            reference,
            event_sender: None,
        }
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    /// Set event sender when one is available
    #[must_use]
    pub fn with_optional_event_sender(mut self, event_sender: Option<EventSender>) -> Self {
        self.event_sender = event_sender;
        self
    }

    pub(crate) fn emit_build(&self, event: BuildEvent) {
        self.emit(AppEvent::Build(event));
    }

    pub(crate) fn phase_started(&self, phase: BuildPhase) {
        self.emit_build(BuildEvent::PhaseStarted {
            session_id: self.session_id.clone(),
            phase,
        });
    }

    pub(crate) fn phase_completed(&self, phase: BuildPhase, duration: Duration) {
        self.emit_build(BuildEvent::PhaseCompleted {
            session_id: self.session_id.clone(),
            phase,
            duration,
        });
    }
}
