//! Unit tests for configuration loading
//!
//! Files are written to temporary directories; the process environment is
//! only touched by the single test that exercises `LINECAST_CONFIG`.

use linecast::config::loader::{ConfigLoader, LoadOptions, CONFIG_ENV_VAR};
use linecast::config::{Config, DEFAULT_DRAIN_GRACE_MS};
use linecast::{Error, Language};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "linecast.toml",
            "[python]\nexecutable = \"/opt/python/bin/python3\"\n\n[logging]\nlevel = \"info\"\n",
        );

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(
            config.python.executable,
            Some(PathBuf::from("/opt/python/bin/python3"))
        );
        assert!(config.python.args.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.session.drain_grace_ms, DEFAULT_DRAIN_GRACE_MS);
        assert!(config.session.inherit_env);
    }

    #[test]
    fn test_full_session_section() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "linecast.toml",
            &format!(
                "[session]\ndrain_grace_ms = 0\ntranscript_limit = 4096\neager_languages = [\"python\", \"sh\"]\nworking_directory = {:?}\ninherit_env = false\n\n[session.environment]\nPYTHONHASHSEED = \"0\"\n",
                dir.path().display().to_string()
            ),
        );

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.session.drain_grace_ms, 0);
        assert_eq!(config.session.transcript_limit, 4096);
        assert_eq!(
            config.eager_languages(),
            vec![Language::Python, Language::Shell]
        );
        assert_eq!(config.session.working_directory.as_deref(), Some(dir.path()));
        assert!(!config.session.inherit_env);
        assert_eq!(
            config.session.environment.get("PYTHONHASHSEED").map(String::as_str),
            Some("0")
        );
    }

    #[test]
    fn test_json_config() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.json",
            r#"{"shell": {"executable": "/bin/sh", "args": ["-s"]}}"#,
        );

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.shell.executable, Some(PathBuf::from("/bin/sh")));
        assert_eq!(config.interpreter(Language::Shell).args, vec!["-s"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.powershell.args = vec!["-NoProfile".to_string()];
        config.session.eager_languages = vec!["powershell".to_string()];
        ConfigLoader::new().save_to_path(&config, &path).unwrap();

        let loaded = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unparsable_file_is_not_used() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "linecast.toml", "[session\ndrain_grace_ms = ");

        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults_when_allowed() {
        let dir = TempDir::new().unwrap();
        let mut loader = ConfigLoader::new();
        loader.set_search_path(dir.path().join("absent.toml"));

        let config = loader.load_config(LoadOptions::default()).unwrap();
        assert_eq!(config, Config::default());
        assert!(loader.current_path().is_none());
    }

    #[test]
    fn test_env_var_is_searched_first() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "from-env.toml", "[logging]\nlevel = \"trace\"\n");

        std::env::set_var(CONFIG_ENV_VAR, &path);
        let loader = ConfigLoader::new();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(loader.search_paths().first(), Some(&path));
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn field_of(config: &Config) -> Option<String> {
        match ConfigLoader::validate_config(config) {
            Err(Error::ConfigValidationFailed { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConfigLoader::validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_drain_window_upper_bound() {
        let mut config = Config::default();
        config.session.drain_grace_ms = 10_000;
        assert!(ConfigLoader::validate_config(&config).is_ok());

        config.session.drain_grace_ms = 10_001;
        assert_eq!(field_of(&config).as_deref(), Some("session.drain_grace_ms"));
    }

    #[test]
    fn test_unknown_eager_language() {
        let mut config = Config::default();
        config.session.eager_languages = vec!["python".to_string(), "ruby".to_string()];
        assert_eq!(field_of(&config).as_deref(), Some("session.eager_languages"));
    }

    #[test]
    fn test_empty_executable() {
        let mut config = Config::default();
        config.shell.executable = Some(PathBuf::new());
        assert_eq!(field_of(&config).as_deref(), Some("shell.executable"));
    }

    #[test]
    fn test_missing_working_directory() {
        let mut config = Config::default();
        config.session.working_directory = Some(PathBuf::from("/nonexistent/linecast-work"));
        assert_eq!(
            field_of(&config).as_deref(),
            Some("session.working_directory")
        );
    }

    #[test]
    fn test_zero_transcript_limit_in_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "linecast.toml", "[session]\ntranscript_limit = 0\n");

        match ConfigLoader::load_from_path(&path) {
            Err(Error::ConfigValidationFailed { field, .. }) => {
                assert_eq!(field, "session.transcript_limit")
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_file_is_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "linecast.toml", "[session]\ndrain_grace_ms = 99999\n");

        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigValidationFailed { .. }));
    }
}
