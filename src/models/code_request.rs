//! Code Request Model

use super::Language;
use serde::{Deserialize, Serialize};

/// A piece of code to run in the persistent interpreter of a language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRequest {
    pub language: Language,
    pub code: String,
}

impl CodeRequest {
    pub fn new(language: Language, code: impl Into<String>) -> Self {
        Self {
            language,
            code: code.into(),
        }
    }
}
