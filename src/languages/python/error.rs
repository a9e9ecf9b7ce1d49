//! Syntax errors raised while reading Python source

use thiserror::Error;

/// Why a piece of Python source could not be turned into a statement tree.
///
/// Every variant carries the 1-based source line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("unmatched '{found}'")]
    UnmatchedBracket { line: usize, found: char },

    #[error("closing '{found}' does not match opening '{expected}'")]
    MismatchedBracket {
        line: usize,
        found: char,
        expected: char,
    },

    #[error("'{opener}' was never closed")]
    UnclosedBracket { line: usize, opener: char },

    #[error("unexpected indent")]
    UnexpectedIndent { line: usize },

    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent { line: usize },

    #[error("expected an indented block after '{keyword}'")]
    ExpectedIndentedBlock { line: usize, keyword: String },

    #[error("expected ':' after '{keyword}'")]
    MissingColon { line: usize, keyword: String },

    #[error("'{keyword}' without a matching statement")]
    OrphanClause { line: usize, keyword: String },

    #[error("expected 'except' or 'finally' block")]
    IncompleteTry { line: usize },

    #[error("decorator is not followed by a def or class")]
    DanglingDecorator { line: usize },

    #[error("expected 'case' inside 'match' block")]
    ExpectedCase { line: usize },
}

impl SyntaxError {
    /// Source line the error was detected on
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::UnterminatedString { line }
            | SyntaxError::UnmatchedBracket { line, .. }
            | SyntaxError::MismatchedBracket { line, .. }
            | SyntaxError::UnclosedBracket { line, .. }
            | SyntaxError::UnexpectedIndent { line }
            | SyntaxError::InconsistentDedent { line }
            | SyntaxError::ExpectedIndentedBlock { line, .. }
            | SyntaxError::MissingColon { line, .. }
            | SyntaxError::OrphanClause { line, .. }
            | SyntaxError::IncompleteTry { line }
            | SyntaxError::DanglingDecorator { line }
            | SyntaxError::ExpectedCase { line } => *line,
        }
    }
}
