//! Integration tests for config

#[cfg(test)]
mod tests {
    use cellar_config::*;
    use cellar_types::{Compiler, ToolchainVersion};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "CELLAR_VERBOSE",
        "CELLAR_DEBUG",
        "CELLAR_PREFIX",
        "CELLAR_LOG_DIR",
        "CELLAR_CACHE",
        "CELLAR_COMPILER",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
verbose = true

[paths]
prefix = "/opt/cellar"
logs = "/tmp/cellar-logs"

[build]
patch_tool = "gpatch"

[toolchain]
compiler = "llvm"
version = "4.1"
compiler_build = 2335
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert!(config.general.verbose);
        assert!(!config.general.debug);
        assert_eq!(config.prefix(), PathBuf::from("/opt/cellar").as_path());
        assert_eq!(config.cellar_path(), PathBuf::from("/opt/cellar/Cellar"));
        assert_eq!(config.logs_path(), PathBuf::from("/tmp/cellar-logs"));
        assert_eq!(config.build.patch_tool, "gpatch");
        assert_eq!(config.build.curl, "curl");
        assert_eq!(config.toolchain.compiler, Compiler::Llvm);
        assert_eq!(config.toolchain.compiler_build, Some(2335));
        assert_eq!(
            config.toolchain_version(),
            Some(ToolchainVersion::parse("4.1"))
        );
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[general\nverbose = ").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            cellar_errors::Error::Config(cellar_errors::ConfigError::ParseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_or_default(Some(std::path::Path::new("/nonexistent/cellar.toml")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            cellar_errors::Error::Config(cellar_errors::ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prefix(), PathBuf::from("/usr/local").as_path());
        assert_eq!(config.cellar_path(), PathBuf::from("/usr/local/Cellar"));
        assert_eq!(config.build.patch_tool, "patch");
        assert!(config.build.user_agent.starts_with("Cellar/"));
        assert_eq!(config.toolchain.compiler, Compiler::Clang);
        assert!(config.toolchain_version().is_none());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("CELLAR_VERBOSE", "1");
        std::env::set_var("CELLAR_DEBUG", "yes");
        std::env::set_var("CELLAR_PREFIX", "/opt/homebrew");
        std::env::set_var("CELLAR_LOG_DIR", "/var/tmp/logs");
        std::env::set_var("CELLAR_COMPILER", "gcc");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert!(config.general.verbose);
        assert!(config.general.debug);
        assert_eq!(config.cellar_path(), PathBuf::from("/opt/homebrew/Cellar"));
        assert_eq!(config.logs_path(), PathBuf::from("/var/tmp/logs"));
        assert_eq!(config.toolchain.compiler, Compiler::Gcc);

        clear_env();
    }

    #[test]
    fn test_merge_env_rejects_invalid_values() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("CELLAR_DEBUG", "sometimes");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());
        clear_env();

        std::env::set_var("CELLAR_COMPILER", "tcc");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());
        clear_env();
    }

    #[test]
    fn test_shell_prefers_configured_value() {
        let mut config = Config::default();
        config.build.shell = Some("/bin/zsh".to_string());
        assert_eq!(config.shell(), "/bin/zsh");
    }
}
