//! PowerShell adapter
//!
//! Instrumentation is purely textual: every source line, blank and comment
//! lines included, is preceded by a line printing its marker.

use super::markers::{active_line_marker, END_OF_EXECUTION};
use super::{LanguageAdapter, LaunchCommand};
use crate::error::Result;
use crate::models::Language;

/// Flags that make PowerShell read commands from stdin without banners
pub const DEFAULT_ARGS: &[&str] = &["-NoLogo", "-NoProfile", "-Command", "-"];

const TRY_OPEN: &str = "\ntry {\n    $ErrorActionPreference = \"Stop\"\n";
const TRY_CLOSE: &str = "\n} catch {\n    Write-Error $_\n}\n";

#[derive(Debug, Clone)]
pub struct PowerShellAdapter {
    launch: LaunchCommand,
}

impl PowerShellAdapter {
    pub fn new(launch: LaunchCommand) -> Self {
        Self { launch }
    }
}

impl LanguageAdapter for PowerShellAdapter {
    fn language(&self) -> Language {
        Language::PowerShell
    }

    fn name(&self) -> &'static str {
        "powershell"
    }

    fn launch_command(&self) -> &LaunchCommand {
        &self.launch
    }

    fn instrument(&self, code: &str) -> Result<String> {
        Ok(code
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                format!("Write-Output \"{}\"\n{}", active_line_marker(index + 1), line)
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn wrap_errors(&self, code: &str) -> Result<String> {
        Ok(format!("{}{}{}", TRY_OPEN, code, TRY_CLOSE))
    }

    fn end_marker_statement(&self) -> String {
        format!("Write-Output \"{}\"", END_OF_EXECUTION)
    }
}
