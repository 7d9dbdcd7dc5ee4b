//! Integration tests for events

#[cfg(test)]
mod tests {
    use cellar_events::*;
    use cellar_types::{Compiler, Version};

    #[tokio::test]
    async fn test_emitter_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");
        tx.emit_phase("wget", BuildState::Staged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::General(GeneralEvent::Error { .. })));
        assert_eq!(event.log_level(), tracing::Level::ERROR);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::General(GeneralEvent::Debug { .. })));
        assert_eq!(event.log_level(), tracing::Level::DEBUG);

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            AppEvent::Build(BuildEvent::PhaseStarted {
                phase: BuildState::Staged,
                ..
            })
        ));
        assert_eq!(event.log_target(), "cellar::events::build");
    }

    #[test]
    fn test_warning_context_is_rendered() {
        let (tx, mut rx) = channel();
        tx.emit_warning_with_context("could not preserve config.log", "permission denied");
        let event = rx.try_recv().unwrap();
        assert_eq!(
            event.message(),
            "Warning: could not preserve config.log (permission denied)"
        );
        assert_eq!(event.log_target(), "cellar::events::general");
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_missing_sender_drops_events() {
        let emitter: Option<EventSender> = None;
        emitter.emit_warning("nobody listening");
    }

    #[test]
    fn test_checksum_missing_is_a_warning_with_digest() {
        let event = AppEvent::Acquisition(AcquisitionEvent::ChecksumMissing {
            path: "/cache/wget-1.13.4.tar.bz2".into(),
            algorithm: "MD5".to_string(),
            computed: "12115c3750a4d92f9c6ac62bac372e85".to_string(),
        });
        assert_eq!(event.log_level(), tracing::Level::WARN);
        assert!(event.message().contains("12115c3750a4d92f9c6ac62bac372e85"));
    }

    #[test]
    fn test_compiler_advisory_names_override_flag() {
        let event = AppEvent::Build(BuildEvent::CompilerAdvisory {
            package: "gmp".to_string(),
            compiler: Compiler::Llvm,
            reason: "(No specific reason was given)\n".to_string(),
            override_flag: "--use-gcc".to_string(),
        });
        assert!(event.message().contains("--use-gcc"));
        assert_eq!(event.event_source(), EventSource::Build);
    }

    #[test]
    fn test_event_serialization_is_tagged_by_domain() {
        let event = AppEvent::Build(BuildEvent::SessionStarted {
            package: "wget".to_string(),
            version: Version::new("1.13.4").unwrap(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "build");
        assert_eq!(json["event"]["type"], "SessionStarted");
        assert_eq!(json["event"]["version"], "1.13.4");
    }

    #[tokio::test]
    async fn test_forward_to_tracing_drains_channel() {
        let (tx, rx) = channel();
        tx.emit_warning("one");
        tx.emit_debug("two");
        drop(tx);
        assert_eq!(forward_to_tracing(rx).await, 2);
    }
}
