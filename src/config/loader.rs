//! Configuration File Loading
//!
//! Finds, parses, validates and saves linecast configuration files.

use super::Config;
use crate::error::{Error, Result};
use crate::models::Language;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "LINECAST_CONFIG";

/// Upper bound accepted for `session.drain_grace_ms`
const MAX_DRAIN_GRACE_MS: u64 = 10_000;

/// Configuration file loader
pub struct ConfigLoader {
    /// Candidate files, in priority order
    search_paths: Vec<PathBuf>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to fall back to the default config if none exists
    pub create_default: bool,
    /// Whether to merge with default config
    pub merge_defaults: bool,
    /// Whether to validate configuration after loading
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            create_default: true,
            merge_defaults: true,
            validate: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader over the standard search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            current_path: None,
        }
    }

    /// Load configuration with default options
    pub fn load() -> Result<Config> {
        Self::new().load_config(LoadOptions::default())
    }

    /// Load configuration with custom options
    pub fn load_with_options(options: LoadOptions) -> Result<Config> {
        Self::new().load_config(options)
    }

    /// Load a specific file, bypassing the search paths
    pub fn load_from_path(path: &Path) -> Result<Config> {
        let mut loader = Self::new();
        loader.set_search_path(path.to_path_buf());
        loader.load_config(LoadOptions {
            create_default: false,
            ..LoadOptions::default()
        })
    }

    /// Run the search with this loader's paths
    pub fn load_config(&mut self, options: LoadOptions) -> Result<Config> {
        if let Some((path, config)) = self.find_and_load_config()? {
            debug!("Loaded configuration from {}", path.display());
            self.current_path = Some(path);

            let config = if options.merge_defaults {
                super::utils::merge_configs(Config::default(), config)
            } else {
                config
            };

            if options.validate {
                Self::validate_config(&config)?;
            }

            return Ok(config);
        }

        if options.create_default {
            debug!("No configuration file found, using defaults");
            let config = Config::default();
            if options.validate {
                Self::validate_config(&config)?;
            }
            Ok(config)
        } else {
            Err(Error::ConfigNotFound)
        }
    }

    /// Save configuration to the current path or default location
    pub fn save(&self, config: &Config) -> Result<PathBuf> {
        let path = self
            .current_path
            .clone()
            .unwrap_or_else(Self::get_default_config_path);

        self.save_to_path(config, &path)?;
        Ok(path)
    }

    /// Save configuration to a specific path; the extension picks the format
    pub fn save_to_path(&self, config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let format = super::utils::get_config_format(path).unwrap_or(ConfigFormat::Toml);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Find and load the first readable configuration file
    fn find_and_load_config(&self) -> Result<Option<(PathBuf, Config)>> {
        for path in &self.search_paths {
            if !path.is_file() {
                continue;
            }

            let format = super::utils::get_config_format(path).unwrap_or(ConfigFormat::Toml);
            match Self::load_config_file(path, format) {
                Ok(config) => return Ok(Some((path.clone(), config))),
                Err(e) => {
                    warn!("Failed to load config from {}: {}", path.display(), e);
                    continue;
                }
            }
        }

        Ok(None)
    }

    /// Load a specific configuration file
    fn load_config_file(path: &Path, format: ConfigFormat) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Default search paths, highest priority first
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            if !explicit.trim().is_empty() {
                paths.push(PathBuf::from(explicit));
            }
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join("linecast.toml"));
            paths.push(cwd.join(".linecast.toml"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("linecast");
            paths.push(dir.join("config.toml"));
            paths.push(dir.join("config.json"));
        }

        paths
    }

    /// Get the default configuration path
    fn get_default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linecast")
            .join("config.toml")
    }

    /// Validate configuration
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.session.drain_grace_ms > MAX_DRAIN_GRACE_MS {
            return Err(Error::ConfigValidationFailed {
                field: "session.drain_grace_ms".to_string(),
                reason: format!("Drain window cannot exceed {} ms", MAX_DRAIN_GRACE_MS),
            });
        }

        if config.session.transcript_limit == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "session.transcript_limit".to_string(),
                reason: "Transcript limit must be greater than 0".to_string(),
            });
        }

        for name in &config.session.eager_languages {
            if Language::from_string(name).is_none() {
                return Err(Error::ConfigValidationFailed {
                    field: "session.eager_languages".to_string(),
                    reason: format!("Unknown language '{}'", name),
                });
            }
        }

        for (field, interpreter) in [
            ("python.executable", &config.python),
            ("powershell.executable", &config.powershell),
            ("shell.executable", &config.shell),
        ] {
            if let Some(executable) = &interpreter.executable {
                if executable.as_os_str().is_empty() {
                    return Err(Error::ConfigValidationFailed {
                        field: field.to_string(),
                        reason: "Executable path cannot be empty".to_string(),
                    });
                }
            }
        }

        if let Some(dir) = &config.session.working_directory {
            if !dir.is_dir() {
                return Err(Error::ConfigValidationFailed {
                    field: "session.working_directory".to_string(),
                    reason: format!("'{}' is not a directory", dir.display()),
                });
            }
        }

        Ok(())
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Add a custom search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    /// Clear all search paths and add a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
