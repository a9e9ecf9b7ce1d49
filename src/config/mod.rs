//! Configuration management for linecast
//!
//! Interpreter launch settings per language, session behaviour, and logging.
//! Every section falls back to its defaults when missing from the file, so a
//! partial configuration file is always valid input.

pub mod loader;

use crate::models::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default quiet window after the end marker, in milliseconds
pub const DEFAULT_DRAIN_GRACE_MS: u64 = 150;

/// Default transcript bound per session, in bytes
pub const DEFAULT_TRANSCRIPT_LIMIT: usize = 1024 * 1024;

/// Main configuration structure for linecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Python interpreter settings
    pub python: InterpreterConfig,

    /// PowerShell interpreter settings
    pub powershell: InterpreterConfig,

    /// POSIX shell settings (also used when PowerShell falls back)
    pub shell: InterpreterConfig,

    /// Session behaviour
    pub session: SessionConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Launch settings for a language
    pub fn interpreter(&self, language: Language) -> &InterpreterConfig {
        match language {
            Language::Python => &self.python,
            Language::PowerShell => &self.powershell,
            Language::Shell => &self.shell,
        }
    }

    /// Languages whose sessions start together with the manager
    pub fn eager_languages(&self) -> Vec<Language> {
        self.session
            .eager_languages
            .iter()
            .filter_map(|name| Language::from_string(name))
            .collect()
    }
}

/// How to launch one interpreter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Explicit executable; searched on PATH when unset
    pub executable: Option<PathBuf>,

    /// Arguments replacing the built-in launch flags when non-empty
    pub args: Vec<String>,
}

impl InterpreterConfig {
    /// Launch arguments, falling back to the given defaults
    pub fn args_or(&self, defaults: &[&str]) -> Vec<String> {
        if self.args.is_empty() {
            defaults.iter().map(|arg| arg.to_string()).collect()
        } else {
            self.args.clone()
        }
    }
}

/// Session-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet window for late lines after the end marker
    pub drain_grace_ms: u64,

    /// Upper bound of the per-session transcript in bytes
    pub transcript_limit: usize,

    /// Languages started by `SessionManager::start_eager`
    pub eager_languages: Vec<String>,

    /// Working directory of spawned interpreters
    pub working_directory: Option<PathBuf>,

    /// Extra environment variables
    pub environment: HashMap<String, String>,

    /// Whether to inherit the parent environment
    pub inherit_env: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            drain_grace_ms: DEFAULT_DRAIN_GRACE_MS,
            transcript_limit: DEFAULT_TRANSCRIPT_LIMIT,
            eager_languages: Vec::new(),
            working_directory: None,
            environment: HashMap::new(),
            inherit_env: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration utilities
pub mod utils {
    use super::*;

    /// Get configuration file format from path
    pub fn get_config_format(path: &Path) -> Option<loader::ConfigFormat> {
        match path.extension()?.to_str()? {
            "toml" => Some(loader::ConfigFormat::Toml),
            "json" => Some(loader::ConfigFormat::Json),
            _ => None,
        }
    }

    /// Overlay a user configuration onto a base configuration
    ///
    /// Unset executables and empty argument lists keep the base value;
    /// environment maps are merged with the overlay winning. Numeric session
    /// settings always come from the overlay, where serde already filled in
    /// defaults for missing keys.
    pub fn merge_configs(base: Config, overlay: Config) -> Config {
        Config {
            python: merge_interpreter(base.python, overlay.python),
            powershell: merge_interpreter(base.powershell, overlay.powershell),
            shell: merge_interpreter(base.shell, overlay.shell),
            session: merge_session(base.session, overlay.session),
            logging: if overlay.logging.level.trim().is_empty() {
                base.logging
            } else {
                overlay.logging
            },
        }
    }

    fn merge_interpreter(base: InterpreterConfig, overlay: InterpreterConfig) -> InterpreterConfig {
        InterpreterConfig {
            executable: overlay.executable.or(base.executable),
            args: if overlay.args.is_empty() {
                base.args
            } else {
                overlay.args
            },
        }
    }

    fn merge_session(base: SessionConfig, overlay: SessionConfig) -> SessionConfig {
        SessionConfig {
            drain_grace_ms: overlay.drain_grace_ms,
            transcript_limit: overlay.transcript_limit,
            eager_languages: if overlay.eager_languages.is_empty() {
                base.eager_languages
            } else {
                overlay.eager_languages
            },
            working_directory: overlay.working_directory.or(base.working_directory),
            environment: {
                let mut merged = base.environment;
                merged.extend(overlay.environment);
                merged
            },
            inherit_env: overlay.inherit_env,
        }
    }
}
