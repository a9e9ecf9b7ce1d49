//! Language registry
//!
//! Maps language identifiers and their aliases to the human-readable name and
//! canonical file suffix of the language, and hands out adapters.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::languages::{adapter_for, LanguageAdapter};
use crate::models::Language;
use serde::Serialize;

/// Registry entry for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSpec {
    pub language: Language,
    /// Name shown to people, e.g. "PowerShell"
    pub proper_name: &'static str,
    /// File suffix without the dot
    pub file_extension: &'static str,
    /// Extra identifiers accepted on lookup
    pub aliases: &'static [&'static str],
}

impl LanguageSpec {
    /// Canonical identifier
    pub fn id(&self) -> &'static str {
        self.language.as_str()
    }

    /// Whether `name` refers to this language (case-insensitive)
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.id().eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// File name for a temporary artifact holding code of this language
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.file_extension)
    }
}

const SPECS: [LanguageSpec; 3] = [
    LanguageSpec {
        language: Language::Python,
        proper_name: "Python",
        file_extension: "py",
        aliases: &["py", "python3"],
    },
    LanguageSpec {
        language: Language::PowerShell,
        proper_name: "PowerShell",
        file_extension: "ps1",
        aliases: &["pwsh", "ps1"],
    },
    LanguageSpec {
        language: Language::Shell,
        proper_name: "Shell",
        file_extension: "sh",
        aliases: &["bash", "sh", "zsh"],
    },
];

/// Lookup table of every supported language
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageRegistry;

impl LanguageRegistry {
    pub fn new() -> Self {
        Self
    }

    /// All entries, in canonical order
    pub fn all(&self) -> &'static [LanguageSpec] {
        &SPECS
    }

    /// Look up an identifier or alias
    pub fn lookup(&self, name: &str) -> Result<&'static LanguageSpec> {
        SPECS
            .iter()
            .find(|spec| spec.matches(name))
            .ok_or_else(|| Error::UnknownLanguage {
                name: name.to_string(),
            })
    }

    /// Entry for a language
    pub fn spec(&self, language: Language) -> &'static LanguageSpec {
        match language {
            Language::Python => &SPECS[0],
            Language::PowerShell => &SPECS[1],
            Language::Shell => &SPECS[2],
        }
    }

    /// Resolve an identifier straight to its adapter
    pub fn adapter(&self, name: &str, config: &Config) -> Result<Box<dyn LanguageAdapter>> {
        let spec = self.lookup(name)?;
        adapter_for(spec.language, config)
    }
}
