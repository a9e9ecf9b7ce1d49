//! Windows interpreter naming

use crate::models::Language;
use crate::platform::traits::RuntimeOps;

pub struct WindowsRuntimes;

impl WindowsRuntimes {
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeOps for WindowsRuntimes {
    fn candidates(&self, language: Language) -> Vec<&'static str> {
        match language {
            Language::Python => vec!["python", "py", "python3"],
            Language::PowerShell => vec!["powershell.exe", "pwsh"],
            // Git for Windows and MSYS ship these
            Language::Shell => vec!["bash", "sh"],
        }
    }

    fn powershell_falls_back_to_shell(&self) -> bool {
        false
    }
}
