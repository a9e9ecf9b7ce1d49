//! Language Definitions
//!
//! Canonical definition of the scripting languages linecast can drive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scripting language backed by an interactive subprocess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python, instrumented through its statement tree
    #[default]
    Python,
    /// PowerShell, instrumented line by line
    PowerShell,
    /// POSIX shell (bash, falling back to sh)
    Shell,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 3] = [Language::Python, Language::PowerShell, Language::Shell];

    /// Get the canonical identifier of the language
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::PowerShell => "powershell",
            Language::Shell => "shell",
        }
    }

    /// Get language from its identifier or a common alias (case-insensitive)
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => Some(Language::Python),
            "powershell" | "pwsh" | "ps1" => Some(Language::PowerShell),
            "shell" | "bash" | "sh" | "zsh" => Some(Language::Shell),
            _ => None,
        }
    }

    /// Whether block structure is expressed through indentation
    pub fn is_indentation_sensitive(&self) -> bool {
        matches!(self, Language::Python)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
