//! Static code scanning
//!
//! Writes submitted code to a temporary file named with the language's
//! suffix and runs an external scanner over it before execution.

use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::models::Language;
use crate::platform::Platform;
use crate::registry::LanguageRegistry;

/// Outcome of scanning one piece of code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub language: Language,
    pub proper_name: String,
    /// Whether the scanner found nothing to report
    pub clean: bool,
    /// Combined scanner output
    pub output: String,
}

impl ScanReport {
    /// One-line verdict for display
    pub fn summary(&self) -> String {
        if self.clean {
            format!("No issues were found in this {} code.", self.proper_name)
        } else {
            format!("Issues were found in this {} code.", self.proper_name)
        }
    }
}

/// Scanner run over code before it is executed
#[async_trait]
pub trait CodeScanner: Send + Sync {
    async fn scan(&self, code: &str, language: Language) -> Result<ScanReport>;
}

/// Scanner backed by the `semgrep` CLI
#[derive(Debug, Clone)]
pub struct SemgrepScanner {
    program: String,
    registry: LanguageRegistry,
}

impl SemgrepScanner {
    pub fn new() -> Self {
        Self::with_program("semgrep")
    }

    /// Use a different semgrep executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            registry: LanguageRegistry::new(),
        }
    }

    fn failed(language: Language, reason: impl Into<String>) -> Error {
        Error::ScanFailed {
            language: language.to_string(),
            reason: reason.into(),
        }
    }
}

impl Default for SemgrepScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeScanner for SemgrepScanner {
    async fn scan(&self, code: &str, language: Language) -> Result<ScanReport> {
        let program = Platform::filesystem()
            .find_command(&self.program)?
            .ok_or_else(|| Self::failed(language, format!("{} not found", self.program)))?;

        let spec = self.registry.spec(language);

        // Removed when `file` goes out of scope
        let mut file = tempfile::Builder::new()
            .prefix("linecast-")
            .suffix(&format!(".{}", spec.file_extension))
            .tempfile()?;
        file.write_all(code.as_bytes())?;
        file.flush()?;

        let path = file.path().to_path_buf();
        let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(Self::failed(language, "temporary file has no name"));
        };
        debug!("Scanning {} code in {}", language, path.display());

        let output = Command::new(&program)
            .args(["scan", "--config", "auto", "--quiet", "--error"])
            .arg(file_name)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| Self::failed(language, e.to_string()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ScanReport {
            language,
            proper_name: spec.proper_name.to_string(),
            clean: output.status.success(),
            output: text,
        })
    }
}
