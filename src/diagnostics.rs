//! System information for bug reports

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;
use crate::languages::adapter_for;
use crate::models::Language;

/// How a language's runtime resolved on this machine
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    pub language: Language,
    /// Adapter that would drive the language
    pub adapter: Option<&'static str>,
    pub path: Option<PathBuf>,
    /// First line of `--version`
    pub version: Option<String>,
    /// Why the runtime could not be resolved or queried
    pub error: Option<String>,
}

/// Host and runtime summary
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: &'static str,
    pub family: &'static str,
    pub arch: &'static str,
    pub version: &'static str,
    pub runtimes: Vec<RuntimeInfo>,
}

impl SystemInfo {
    /// Resolve every language's runtime and ask it for its version
    pub fn collect(config: &Config) -> Self {
        Self {
            os: std::env::consts::OS,
            family: std::env::consts::FAMILY,
            arch: std::env::consts::ARCH,
            version: crate::VERSION,
            runtimes: Language::ALL
                .into_iter()
                .map(|language| RuntimeInfo::collect(language, config))
                .collect(),
        }
    }
}

impl RuntimeInfo {
    fn collect(language: Language, config: &Config) -> Self {
        let adapter = match adapter_for(language, config) {
            Ok(adapter) => adapter,
            Err(e) => {
                return Self {
                    language,
                    adapter: None,
                    path: None,
                    version: None,
                    error: Some(e.to_string()),
                }
            }
        };

        let path = adapter.launch_command().program.clone();
        let (version, error) = match runtime_version(&path) {
            Ok(version) => (Some(version), None),
            Err(e) => (None, Some(e)),
        };

        Self {
            language,
            adapter: Some(adapter.name()),
            path: Some(path),
            version,
            error,
        }
    }
}

/// First non-empty line a runtime prints for `--version`
fn runtime_version(program: &Path) -> std::result::Result<String, String> {
    let output = Command::new(program)
        .arg("--version")
        .output()
        .map_err(|e| e.to_string())?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "no version output".to_string())
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "linecast {}", self.version)?;
        writeln!(f, "OS: {} ({}, {})", self.os, self.family, self.arch)?;
        for runtime in &self.runtimes {
            write!(f, "{}: ", runtime.language)?;
            match (&runtime.path, &runtime.version) {
                (Some(path), Some(version)) => write!(f, "{} ({})", path.display(), version)?,
                (Some(path), None) => write!(f, "{}", path.display())?,
                _ => write!(f, "not available")?,
            }
            if let Some(adapter) = runtime.adapter {
                write!(f, " via {}", adapter)?;
            }
            if let Some(error) = &runtime.error {
                write!(f, " [{}]", error)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
