//! Python adapter
//!
//! Code is parsed into a statement tree, a marker `print` is put in front of
//! every statement of every block, and the result is written back out. The
//! interpreter runs in interactive mode (`-i -q -u`), so prompt echoes show
//! up on stderr and are filtered during classification.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod transform;

use super::markers::{self, END_OF_EXECUTION};
use super::{LanguageAdapter, LaunchCommand};
use crate::error::{Error, Result};
use crate::models::{Language, LineEvent};
use crate::process::StreamSource;
use ast::Stmt;
use lexer::Lexer;
use parser::Parser;

pub use error::SyntaxError;

/// Interactive, no banner, unbuffered
pub const DEFAULT_ARGS: &[&str] = &["-i", "-q", "-u"];

/// Parse Python source into a statement tree
pub fn parse(source: &str) -> std::result::Result<Vec<Stmt>, SyntaxError> {
    let lines = Lexer::new(source).tokenize()?;
    Parser::new(lines).parse_module()
}

/// Source with a marker statement before every statement
pub fn instrument_source(source: &str) -> std::result::Result<String, SyntaxError> {
    Ok(transform::render(&transform::add_active_line_markers(
        parse(source)?,
    )))
}

/// Source wrapped in a single traceback-printing `try`
pub fn wrap_source(source: &str) -> std::result::Result<String, SyntaxError> {
    Ok(transform::render(&[transform::wrap_in_try(parse(source)?)]))
}

/// Strip leading `>>> ` / `... ` prompt echoes.
/// Returns the remainder and whether any prompt was removed.
pub fn strip_prompts(line: &str) -> (&str, bool) {
    let mut rest = line;
    let mut stripped = false;

    loop {
        let candidate = rest.trim_start();
        let Some(after) = candidate
            .strip_prefix(">>>")
            .or_else(|| candidate.strip_prefix("..."))
        else {
            break;
        };
        if !(after.is_empty() || after.starts_with(char::is_whitespace)) {
            break;
        }
        rest = after.strip_prefix(' ').unwrap_or(after);
        stripped = true;
    }

    (rest, stripped)
}

#[derive(Debug, Clone)]
pub struct PythonAdapter {
    launch: LaunchCommand,
}

impl PythonAdapter {
    pub fn new(launch: LaunchCommand) -> Self {
        Self { launch }
    }

    fn syntax_error(err: SyntaxError) -> Error {
        Error::InstrumentationFailed {
            language: Language::Python.to_string(),
            line: err.line(),
            message: err.to_string(),
        }
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn name(&self) -> &'static str {
        "python"
    }

    fn launch_command(&self) -> &LaunchCommand {
        &self.launch
    }

    fn instrument(&self, code: &str) -> Result<String> {
        instrument_source(code).map_err(Self::syntax_error)
    }

    fn wrap_errors(&self, code: &str) -> Result<String> {
        wrap_source(code).map_err(Self::syntax_error)
    }

    fn end_marker_statement(&self) -> String {
        format!("print(\"{}\")", END_OF_EXECUTION)
    }

    /// Classify a line that may start with prompt echoes
    fn classify_line(&self, line: &str) -> LineEvent {
        let (rest, had_prompt) = strip_prompts(line);
        if had_prompt && rest.trim().is_empty() {
            return LineEvent::Discard;
        }
        markers::classify(rest)
    }

    /// Prompts only ever reach stderr; stdout is user output verbatim
    fn classify_output(&self, line: &str, source: StreamSource) -> LineEvent {
        match source {
            StreamSource::Stdout => markers::classify(line),
            StreamSource::Stderr => self.classify_line(line),
        }
    }
}
