//! Unix interpreter naming

use crate::models::Language;
use crate::platform::traits::RuntimeOps;

pub struct UnixRuntimes;

impl UnixRuntimes {
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeOps for UnixRuntimes {
    fn candidates(&self, language: Language) -> Vec<&'static str> {
        match language {
            Language::Python => vec!["python3", "python", "py"],
            Language::PowerShell => vec!["pwsh"],
            Language::Shell => vec!["bash", "sh"],
        }
    }

    fn powershell_falls_back_to_shell(&self) -> bool {
        true
    }
}
