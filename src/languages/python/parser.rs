//! Recursive-descent block parser
//!
//! Builds a [`Stmt`] tree from [`LogicalLine`]s using indentation alone.
//! `match` and `case` are soft keywords: `match` only opens a block when the
//! line ends in a header colon, and inside a match block `case` may also carry
//! its body after the colon.

use super::ast::{Clause, Def, If, Loop, Match, Simple, Stmt, Try};
use super::error::SyntaxError;
use super::lexer::{leading_word, LogicalLine};

/// What a logical line starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    Simple,
    Decorator,
    If,
    Elif,
    Else,
    Loop,
    Try,
    Except,
    Finally,
    With,
    Def,
    Match,
    Case,
}

impl Head {
    fn of(line: &LogicalLine) -> Head {
        let text = line.text.as_str();
        if text.starts_with('@') {
            return Head::Decorator;
        }

        let mut word = leading_word(text);
        if word == "async" {
            word = leading_word(text[word.len()..].trim_start());
            return match word {
                "def" => Head::Def,
                "for" => Head::Loop,
                "with" => Head::With,
                _ => Head::Simple,
            };
        }

        match word {
            "if" => Head::If,
            "elif" => Head::Elif,
            "else" => Head::Else,
            "for" | "while" => Head::Loop,
            "try" => Head::Try,
            "except" => Head::Except,
            "finally" => Head::Finally,
            "with" => Head::With,
            "def" | "class" => Head::Def,
            "match" if opens_soft_block(line, word, false) => Head::Match,
            "case" if opens_soft_block(line, word, false) => Head::Case,
            _ => Head::Simple,
        }
    }
}

/// `match x:` / `case p:` rather than a statement using the name
///
/// With `inline` the header colon may be followed by statements on the same
/// line; the subject is always the text between the keyword and that colon.
fn opens_soft_block(line: &LogicalLine, word: &str, inline: bool) -> bool {
    let Some(colon) = line.header_colon() else {
        return false;
    };
    if !inline && colon + 1 != line.text.len() {
        return false;
    }
    let subject = &line.text[word.len()..colon];
    !subject.trim().is_empty()
        && !matches!(
            subject.chars().next(),
            Some('=' | '.' | ',' | ':' | ')' | ']' | '}')
        )
}

/// A `case` clause inside a match block, inline body allowed
fn is_case_clause(line: &LogicalLine) -> bool {
    line.first_word() == "case" && opens_soft_block(line, "case", true)
}

pub struct Parser {
    lines: Vec<LogicalLine>,
    position: usize,
}

impl Parser {
    pub fn new(lines: Vec<LogicalLine>) -> Self {
        Self { lines, position: 0 }
    }

    /// Parse the whole source as a module
    pub fn parse_module(mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if let Some(first) = self.lines.first() {
            if first.indent > 0 {
                return Err(SyntaxError::UnexpectedIndent { line: first.line });
            }
        }
        self.parse_suite(0)
    }

    fn peek(&self) -> Option<&LogicalLine> {
        self.lines.get(self.position)
    }

    fn advance(&mut self) -> Option<LogicalLine> {
        let line = self.lines.get(self.position).cloned();
        if line.is_some() {
            self.position += 1;
        }
        line
    }

    /// Head of the next line if it sits exactly at `indent`
    fn peek_clause(&self, indent: usize) -> Option<Head> {
        self.peek()
            .filter(|line| line.indent == indent)
            .map(Head::of)
    }

    /// Statements at exactly `indent` until the first shallower line
    fn parse_suite(&mut self, indent: usize) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();

        while let Some(next) = self.peek() {
            if next.indent < indent {
                break;
            }
            if next.indent > indent {
                return Err(SyntaxError::UnexpectedIndent { line: next.line });
            }
            stmts.extend(self.parse_statement(indent)?);
        }

        Ok(stmts)
    }

    fn parse_statement(&mut self, indent: usize) -> Result<Vec<Stmt>, SyntaxError> {
        let Some(line) = self.advance() else {
            return Ok(Vec::new());
        };

        let stmt = match Head::of(&line) {
            Head::Simple => return Ok(split_simple(&line, 0)),
            Head::Decorator => self.parse_decorated(line, indent)?,
            Head::If => {
                let (header, inline) = split_header(&line, "if")?;
                Stmt::If(self.parse_if(&line, header, inline, indent)?)
            }
            Head::Loop => {
                let keyword = if line.first_word() == "while" {
                    "while"
                } else {
                    "for"
                };
                let (header, inline) = split_header(&line, keyword)?;
                let body = self.parse_body(&line, indent, keyword, inline)?;
                let orelse = self.parse_else(indent)?;
                Stmt::Loop(Loop {
                    line: line.line,
                    header,
                    body,
                    orelse,
                })
            }
            Head::Try => self.parse_try(line, indent)?,
            Head::With => {
                let (header, inline) = split_header(&line, "with")?;
                let body = self.parse_body(&line, indent, "with", inline)?;
                Stmt::With(Clause {
                    line: line.line,
                    header,
                    body,
                })
            }
            Head::Def => self.parse_def(line, Vec::new(), indent)?,
            Head::Match => self.parse_match(line, indent)?,
            Head::Elif | Head::Else | Head::Except | Head::Finally | Head::Case => {
                return Err(SyntaxError::OrphanClause {
                    line: line.line,
                    keyword: line.first_word().to_string(),
                })
            }
        };

        Ok(vec![stmt])
    }

    /// Body of a compound clause: its inline statements, or the indented
    /// block that follows
    fn parse_body(
        &mut self,
        header: &LogicalLine,
        indent: usize,
        keyword: &str,
        inline: Vec<Stmt>,
    ) -> Result<Vec<Stmt>, SyntaxError> {
        if !inline.is_empty() {
            return Ok(inline);
        }

        let body_indent = match self.peek() {
            Some(next) if next.indent > indent => next.indent,
            _ => {
                return Err(SyntaxError::ExpectedIndentedBlock {
                    line: header.line,
                    keyword: keyword.to_string(),
                })
            }
        };

        let body = self.parse_suite(body_indent)?;
        self.check_dedent(indent, body_indent)?;
        Ok(body)
    }

    /// After a block at `body_indent`, the next line must return to an
    /// enclosing level
    fn check_dedent(&self, indent: usize, body_indent: usize) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(after) if after.indent > indent && after.indent < body_indent => {
                Err(SyntaxError::InconsistentDedent { line: after.line })
            }
            _ => Ok(()),
        }
    }

    fn parse_if(
        &mut self,
        line: &LogicalLine,
        header: String,
        inline: Vec<Stmt>,
        indent: usize,
    ) -> Result<If, SyntaxError> {
        let body = self.parse_body(line, indent, "if", inline)?;

        let orelse = match self.peek_clause(indent) {
            Some(Head::Elif) => {
                let Some(elif) = self.advance() else {
                    return Err(SyntaxError::OrphanClause {
                        line: line.line,
                        keyword: "elif".to_string(),
                    });
                };
                let (elif_header, elif_inline) = split_header(&elif, "elif")?;
                let nested_header = format!("if{}", &elif_header["elif".len()..]);
                vec![Stmt::If(self.parse_if(
                    &elif,
                    nested_header,
                    elif_inline,
                    indent,
                )?)]
            }
            Some(Head::Else) => self.parse_else(indent)?,
            _ => Vec::new(),
        };

        Ok(If {
            line: line.line,
            header,
            body,
            orelse,
        })
    }

    /// Optional `else:` clause at `indent`
    fn parse_else(&mut self, indent: usize) -> Result<Vec<Stmt>, SyntaxError> {
        self.parse_optional_clause(indent, Head::Else, "else")
    }

    fn parse_optional_clause(
        &mut self,
        indent: usize,
        head: Head,
        keyword: &str,
    ) -> Result<Vec<Stmt>, SyntaxError> {
        if self.peek_clause(indent) != Some(head) {
            return Ok(Vec::new());
        }
        let Some(line) = self.advance() else {
            return Ok(Vec::new());
        };
        let (_, inline) = split_header(&line, keyword)?;
        self.parse_body(&line, indent, keyword, inline)
    }

    fn parse_try(&mut self, line: LogicalLine, indent: usize) -> Result<Stmt, SyntaxError> {
        let (_, inline) = split_header(&line, "try")?;
        let body = self.parse_body(&line, indent, "try", inline)?;

        let mut handlers = Vec::new();
        while self.peek_clause(indent) == Some(Head::Except) {
            let Some(handler) = self.advance() else {
                break;
            };
            let (header, inline) = split_header(&handler, "except")?;
            let handler_body = self.parse_body(&handler, indent, "except", inline)?;
            handlers.push(Clause {
                line: handler.line,
                header,
                body: handler_body,
            });
        }

        let orelse = self.parse_else(indent)?;
        let finalbody = self.parse_optional_clause(indent, Head::Finally, "finally")?;

        if handlers.is_empty() && finalbody.is_empty() {
            return Err(SyntaxError::IncompleteTry { line: line.line });
        }

        Ok(Stmt::Try(Try {
            line: line.line,
            body,
            handlers,
            orelse,
            finalbody,
        }))
    }

    fn parse_decorated(&mut self, first: LogicalLine, indent: usize) -> Result<Stmt, SyntaxError> {
        let mut decorators = vec![first.text.clone()];

        while self.peek_clause(indent) == Some(Head::Decorator) {
            if let Some(next) = self.advance() {
                decorators.push(next.text);
            }
        }

        if self.peek_clause(indent) != Some(Head::Def) {
            return Err(SyntaxError::DanglingDecorator { line: first.line });
        }
        match self.advance() {
            Some(def) => self.parse_def(def, decorators, indent),
            None => Err(SyntaxError::DanglingDecorator { line: first.line }),
        }
    }

    fn parse_def(
        &mut self,
        line: LogicalLine,
        decorators: Vec<String>,
        indent: usize,
    ) -> Result<Stmt, SyntaxError> {
        let keyword = if line.first_word() == "class" {
            "class"
        } else {
            "def"
        };
        let (header, inline) = split_header(&line, keyword)?;
        let body = self.parse_body(&line, indent, keyword, inline)?;
        Ok(Stmt::Def(Def {
            line: line.line,
            decorators,
            header,
            body,
        }))
    }

    fn parse_match(&mut self, line: LogicalLine, indent: usize) -> Result<Stmt, SyntaxError> {
        let (header, _) = split_header(&line, "match")?;

        let case_indent = match self.peek() {
            Some(next) if next.indent > indent => next.indent,
            _ => {
                return Err(SyntaxError::ExpectedIndentedBlock {
                    line: line.line,
                    keyword: "match".to_string(),
                })
            }
        };

        let mut cases = Vec::new();
        while let Some(next) = self.peek() {
            if next.indent < case_indent {
                break;
            }
            if next.indent > case_indent {
                return Err(SyntaxError::UnexpectedIndent { line: next.line });
            }
            if !is_case_clause(next) {
                return Err(SyntaxError::ExpectedCase { line: next.line });
            }
            let Some(case) = self.advance() else {
                break;
            };
            let (case_header, inline) = split_header(&case, "case")?;
            let body = self.parse_body(&case, case_indent, "case", inline)?;
            cases.push(Clause {
                line: case.line,
                header: case_header,
                body,
            });
        }
        self.check_dedent(indent, case_indent)?;

        Ok(Stmt::Match(Match {
            line: line.line,
            header,
            cases,
        }))
    }
}

/// Split a compound line into its header (colon included) and the
/// statements written after the colon on the same line
fn split_header(line: &LogicalLine, keyword: &str) -> Result<(String, Vec<Stmt>), SyntaxError> {
    let colon = line
        .header_colon()
        .ok_or_else(|| SyntaxError::MissingColon {
            line: line.line,
            keyword: keyword.to_string(),
        })?;

    let header = line.text[..=colon].to_string();
    Ok((header, split_simple(line, colon + 1)))
}

/// Semicolon-separated simple statements of `line` from byte offset `start`
fn split_simple(line: &LogicalLine, start: usize) -> Vec<Stmt> {
    let mut stmts = Vec::new();
    let mut from = start;

    let ends = line
        .semicolons
        .iter()
        .copied()
        .filter(|&offset| offset >= start)
        .chain(std::iter::once(line.text.len()));

    for end in ends {
        let text = line.text[from..end].trim();
        if !text.is_empty() {
            stmts.push(Stmt::Simple(Simple {
                line: line.line,
                text: text.to_string(),
            }));
        }
        from = end + 1;
    }

    stmts
}
