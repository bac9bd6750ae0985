//! Integration tests for config

#[cfg(test)]
mod tests {
    use cpkg_config::*;
    use cpkg_types::{ColorChoice, OutputFormat};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 6] = [
        "CPKG_OUTPUT",
        "CPKG_BUILD_JOBS",
        "CPKG_GIT",
        "CPKG_CMAKE",
        "CPKG_CACHE_DIR",
        "CPKG_WORK_DIR",
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
default_output = "plain"
color = "never"

[build]
build_jobs = 4
keep_work_dir = true

[tools]
cmake = "/opt/cmake/bin/cmake"

[paths]
cache_dir = "/var/cache/cpkg"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.build.build_jobs, 4);
        assert!(config.build.keep_work_dir);
        assert!(config.build.shallow_clone);
        assert_eq!(config.tools.cmake, "/opt/cmake/bin/cmake");
        assert_eq!(config.tools.git, "git");
        assert_eq!(config.cache_path(), PathBuf::from("/var/cache/cpkg"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = Config::load_from_file(std::path::Path::new("/nonexistent/cpkg.toml")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[build\nbuild_jobs = ").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("CPKG_OUTPUT", "json");
        std::env::set_var("CPKG_BUILD_JOBS", "6");
        std::env::set_var("CPKG_CMAKE", "cmake3");
        std::env::set_var("CPKG_WORK_DIR", "/tmp/cpkg-work");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.build.build_jobs, 6);
        assert_eq!(config.tools.cmake, "cmake3");
        assert_eq!(config.work_path(), PathBuf::from("/tmp/cpkg-work"));

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("CPKG_BUILD_JOBS", "many");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn test_calculate_build_jobs() {
        assert_eq!(calculate_build_jobs(3), 3);
        assert!(calculate_build_jobs(0) >= 1);
    }
}
