//! Integration tests for events

#[cfg(test)]
mod tests {
    use cpkg_errors::{BuildError, Error};
    use cpkg_events::*;
    use cpkg_types::PackageReference;

    #[tokio::test]
    async fn test_event_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_warning("could not remove work directory");
        tx.emit(AppEvent::Build(BuildEvent::PhaseStarted {
            session_id: "s".into(),
            phase: BuildPhase::Source,
        }));

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Warning { ref message })
                if message == "could not remove work directory"
        ));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::Build(BuildEvent::PhaseStarted {
                phase: BuildPhase::Source,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_optional_sender_is_silent() {
        let none: Option<EventSender> = None;
        none.emit_warning("nobody listens");
    }

    #[test]
    fn test_failure_context_from_error() {
        let err: Error = BuildError::CompileFailed {
            status: Some(2),
            output: "boom".into(),
        }
        .into();
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("build.compile_failed"));
        assert!(failure.message.starts_with("[compile]"));
        assert!(!failure.retryable);

        let event = AppEvent::Build(BuildEvent::Failed {
            session_id: "s".into(),
            package: PackageReference::new("httpmockserver", "0.1"),
            phase: Some(BuildPhase::Compile),
            failure,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"]["phase"], "compile");
        assert_eq!(json["event"]["failure"]["code"], "build.compile_failed");
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = AppEvent::Build(BuildEvent::PhaseStarted {
            session_id: "s".into(),
            phase: BuildPhase::Source,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "build");
        assert_eq!(json["event"]["type"], "PhaseStarted");
        assert_eq!(json["event"]["phase"], "source");
    }
}
