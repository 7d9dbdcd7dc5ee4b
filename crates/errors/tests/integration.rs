//! Integration tests for error types

#[cfg(test)]
mod tests {
    use cellar_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::DownloadFailed("https://example.com timed out".into());
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_transport());
        assert_eq!(err.user_code(), Some("network.download_failed"));
        assert!(err.user_hint().is_some());
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = BuildError::ChecksumMismatch {
            algorithm: "SHA256".into(),
            expected: "abc".into(),
            actual: "def".into(),
            path: "/cache/foo-1.0.tar.gz".into(),
        };
        let text = err.to_string();
        assert!(text.contains("SHA256 mismatch"));
        assert!(text.contains("Expected: abc"));
        assert!(text.contains("Got: def"));
        assert!(text.contains("Archive: /cache/foo-1.0.tar.gz"));
        assert!(text.contains("remove the file above"));
    }

    #[test]
    fn test_command_failed_display() {
        let err = BuildError::CommandFailed {
            command: "make".into(),
            args: vec!["install".into()],
            output: "error: foo".into(),
            status: Some(2),
        };
        assert_eq!(err.to_string(), "failed executing: make install (exit status 2)");
        assert_eq!(err.captured_output(), Some("error: foo"));
        assert!(!err.was_running_configure());
    }

    #[test]
    fn test_configure_detection() {
        let err = BuildError::CommandFailed {
            command: "./configure".into(),
            args: vec![],
            output: String::new(),
            status: Some(1),
        };
        assert!(err.was_running_configure());
        assert!(err.user_hint().is_some());
    }

    #[test]
    fn test_user_codes() {
        let err: Error = PackageError::Unavailable { name: "jq".into() }.into();
        assert_eq!(err.user_code(), Some("package.unavailable"));
        assert!(!err.is_retryable());

        let err: Error = NetworkError::DownloadFailed("boom".into()).into();
        assert!(err.is_retryable());
        assert_eq!(Error::Cancelled.user_code(), Some("error.cancelled"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
    }

    #[test]
    fn test_io_error_names_the_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let err = Error::io_with_path(&io_err, "/usr/local/Cellar/jq/1.6");
        assert_eq!(
            err.to_string(),
            "/usr/local/Cellar/jq/1.6: No such file or directory"
        );
        assert_eq!(err.user_code(), Some("error.io"));
        assert!(err.user_hint().is_none());
    }
}
