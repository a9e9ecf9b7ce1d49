//! Logical-line lexer for Python source
//!
//! Splits source text into [`LogicalLine`]s: physical lines joined by open
//! brackets, backslash continuations and multi-line strings. Comments and
//! blank lines never reach the parser. The lexer also records where the
//! top-level `:` and `;` characters are, which is all the parser needs to
//! separate a compound header from its inline body and to split
//! semicolon-separated statements.

use super::error::SyntaxError;

/// One logical line of source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based physical line the logical line starts on
    pub line: usize,
    /// Indentation width in columns (tabs advance to the next multiple of 8)
    pub indent: usize,
    /// Source text without indentation or comments. Continuation lines are
    /// kept verbatim after an embedded `\n`.
    pub text: String,
    /// Byte offsets of top-level `:` not followed by `=`
    pub colons: Vec<usize>,
    /// Byte offsets of top-level `;`
    pub semicolons: Vec<usize>,
}

impl LogicalLine {
    /// Offset of the colon that ends a compound statement header
    pub fn header_colon(&self) -> Option<usize> {
        self.colons.first().copied()
    }

    /// Leading identifier of the line
    pub fn first_word(&self) -> &str {
        leading_word(&self.text)
    }
}

/// Leading identifier of `text` (empty when it starts with punctuation)
pub fn leading_word(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

/// Open construct while scanning a logical line
#[derive(Debug, Clone, Copy)]
enum Frame {
    Bracket { opener: char, line: usize },
    Str { quote: char, triple: bool, format: bool, line: usize },
    /// Replacement field `{...}` of an f-string
    Field,
}

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.replace("\r\n", "\n").chars().collect(),
            position: 0,
            line: 1,
        }
    }

    /// Produce every logical line of the source
    pub fn tokenize(mut self) -> Result<Vec<LogicalLine>, SyntaxError> {
        let mut lines = Vec::new();

        loop {
            let indent = self.skip_indentation();
            match self.peek() {
                None => break,
                Some('\n') => {
                    self.advance();
                }
                Some('#') => self.skip_comment(),
                Some(_) => lines.push(self.read_logical_line(indent)?),
            }
        }

        Ok(lines)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume leading whitespace and return its width in columns
    fn skip_indentation(&mut self) -> usize {
        let mut column = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => column += 1,
                '\t' => column = (column / 8 + 1) * 8,
                '\x0c' => column = 0,
                _ => break,
            }
            self.position += 1;
        }
        column
    }

    /// Skip to (not past) the end of the physical line
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.position += 1;
        }
    }

    fn read_logical_line(&mut self, indent: usize) -> Result<LogicalLine, SyntaxError> {
        let start_line = self.line;
        let mut text = String::new();
        let mut colons = Vec::new();
        let mut semicolons = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();

        // Start of the current physical line within `text`, and whether that
        // line began inside a string literal
        let mut physical_start = 0;
        let mut physical_in_string = false;

        loop {
            let Some(c) = self.peek() else {
                let unclosed = frames.iter().rev().find_map(|frame| match *frame {
                    Frame::Str { line, .. } => Some(SyntaxError::UnterminatedString { line }),
                    Frame::Bracket { opener, line } => {
                        Some(SyntaxError::UnclosedBracket { line, opener })
                    }
                    Frame::Field => None,
                });
                match unclosed {
                    Some(err) => return Err(err),
                    None => break,
                }
            };

            if let Some(Frame::Str {
                quote,
                triple,
                format,
                line,
            }) = frames.last().copied()
            {
                match c {
                    '\\' => {
                        text.push(c);
                        self.advance();
                        if let Some(escaped) = self.advance() {
                            text.push(escaped);
                            if escaped == '\n' {
                                physical_start = text.len();
                                physical_in_string = true;
                            }
                        }
                    }
                    '\n' if !triple => return Err(SyntaxError::UnterminatedString { line }),
                    '\n' => {
                        text.push(c);
                        self.advance();
                        physical_start = text.len();
                        physical_in_string = true;
                    }
                    c if c == quote => {
                        let closes = !triple
                            || (self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote));
                        let width = if triple && closes { 3 } else { 1 };
                        for _ in 0..width {
                            text.push(quote);
                            self.advance();
                        }
                        if closes {
                            frames.pop();
                        }
                    }
                    '{' if format => {
                        text.push(c);
                        self.advance();
                        if self.peek() == Some('{') {
                            text.push('{');
                            self.advance();
                        } else {
                            frames.push(Frame::Field);
                        }
                    }
                    _ => {
                        text.push(c);
                        self.advance();
                    }
                }
                continue;
            }

            match c {
                '#' if !matches!(frames.last(), Some(Frame::Field)) => {
                    self.skip_comment();
                    continue;
                }
                '\\' if self.peek_at(1) == Some('\n') => {
                    text.push_str("\\\n");
                    self.advance();
                    self.advance();
                    physical_start = text.len();
                    physical_in_string = false;
                    continue;
                }
                '\n' => {
                    if frames.is_empty() {
                        self.advance();
                        break;
                    }
                    if physical_start > 0
                        && !physical_in_string
                        && text[physical_start..].trim().is_empty()
                    {
                        // Blank continuation line outside any string
                        text.truncate(physical_start);
                    } else {
                        text.push('\n');
                    }
                    self.advance();
                    physical_start = text.len();
                    physical_in_string = false;
                    continue;
                }
                '(' | '[' | '{' => frames.push(Frame::Bracket {
                    opener: c,
                    line: self.line,
                }),
                ')' | ']' | '}' => match frames.last().copied() {
                    Some(Frame::Bracket { opener, .. }) if closer_for(opener) == c => {
                        frames.pop();
                    }
                    Some(Frame::Field) if c == '}' => {
                        frames.pop();
                    }
                    Some(Frame::Bracket { opener, .. }) => {
                        return Err(SyntaxError::MismatchedBracket {
                            line: self.line,
                            found: c,
                            expected: opener,
                        })
                    }
                    _ => {
                        return Err(SyntaxError::UnmatchedBracket {
                            line: self.line,
                            found: c,
                        })
                    }
                },
                '\'' | '"' => {
                    let format = string_prefix(&text).is_some_and(is_format_prefix);
                    let triple = self.peek_at(1) == Some(c) && self.peek_at(2) == Some(c);
                    frames.push(Frame::Str {
                        quote: c,
                        triple,
                        format,
                        line: self.line,
                    });
                    let width = if triple { 3 } else { 1 };
                    for _ in 0..width {
                        text.push(c);
                        self.advance();
                    }
                    continue;
                }
                ':' if frames.is_empty() && self.peek_at(1) != Some('=') => {
                    colons.push(text.len());
                }
                ';' if frames.is_empty() => semicolons.push(text.len()),
                _ => {}
            }

            text.push(c);
            self.advance();
        }

        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);

        Ok(LogicalLine {
            line: start_line,
            indent,
            text,
            colons,
            semicolons,
        })
    }
}

fn closer_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// String prefix letters immediately before a quote, if they form one
fn string_prefix(text: &str) -> Option<&str> {
    let word_start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    let prefix = &text[word_start..];
    let valid = prefix.len() <= 2
        && prefix
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'u' | 'f' | 't'));
    valid.then_some(prefix)
}

fn is_format_prefix(prefix: &str) -> bool {
    prefix
        .chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'f' | 't'))
}
