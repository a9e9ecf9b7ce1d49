//! POSIX shell adapter (bash, then sh)
//!
//! Serves the `shell` language and stands in for PowerShell where `pwsh` is
//! not installed. Markers are inserted textually, but only in front of lines
//! that begin a command: an `echo` in front of `then`, inside a here-document
//! or after a trailing `|` would change what the shell parses.
//!
//! A parse error ends a non-interactive shell, so every submission is first
//! run through `<shell> -n` and rejected if that fails.

use super::markers::{active_line_marker, END_OF_EXECUTION};
use super::{LanguageAdapter, LaunchCommand};
use crate::error::{Error, Result};
use crate::models::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::process::{Command, Stdio};

/// The shell reads commands from its piped stdin; no flags needed
pub const DEFAULT_ARGS: &[&str] = &[];

/// Leading words that continue a compound command rather than start one
const CLAUSE_WORDS: &[&str] = &[
    "then", "do", "done", "fi", "else", "elif", "esac", ";;", "}", ")", "in",
];

/// `pattern)` or `(pattern)` at the start of a case arm
static CASE_ARM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\(?\s*[^\s()][^()]*\)"#).expect("case arm pattern is valid"));

/// `bash: line 2: message` or `sh: 2: message`
static SYNTAX_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^:]*: (?:line )?(\d+): (.+)$").expect("syntax error pattern is valid")
});

#[derive(Debug, Clone)]
pub struct PosixShellAdapter {
    language: Language,
    launch: LaunchCommand,
}

impl PosixShellAdapter {
    /// `language` is what the session asked for; it is PowerShell when this
    /// adapter is the fallback
    pub fn new(language: Language, launch: LaunchCommand) -> Self {
        Self { language, launch }
    }
}

/// Turn the stderr of `<shell> -n` into a line number and message
fn parse_syntax_error(stderr: &str) -> (usize, String) {
    stderr
        .lines()
        .find_map(|line| {
            let caps = SYNTAX_ERROR.captures(line)?;
            let number = caps[1].parse().ok()?;
            Some((number, caps[2].trim().to_string()))
        })
        .unwrap_or_else(|| (1, stderr.trim().to_string()))
}

impl LanguageAdapter for PosixShellAdapter {
    fn language(&self) -> Language {
        self.language
    }

    fn name(&self) -> &'static str {
        "posix-shell"
    }

    fn launch_command(&self) -> &LaunchCommand {
        &self.launch
    }

    fn check_syntax(&self, code: &str) -> Result<()> {
        let spawned = Command::new(&self.launch.program)
            .arg("-n")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Skipping syntax check, {} did not start: {}", self.launch, e);
                return Ok(());
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            // The checker stops reading at the first error
            if let Err(e) = writeln!(stdin, "{}", code) {
                debug!("Syntax check input cut short: {}", e);
            }
        }

        let output = child.wait_with_output()?;
        if output.status.success() {
            return Ok(());
        }

        let (line, message) = parse_syntax_error(&String::from_utf8_lossy(&output.stderr));
        Err(Error::InstrumentationFailed {
            language: self.language.to_string(),
            line,
            message,
        })
    }

    fn instrument(&self, code: &str) -> Result<String> {
        let mut scanner = ShellScanner::default();
        let mut out = Vec::new();

        for (index, line) in code.split('\n').enumerate() {
            if scanner.starts_command(line) {
                let indent = &line[..line.len() - line.trim_start().len()];
                out.push(format!(
                    "{}echo \"{}\"",
                    indent,
                    active_line_marker(index + 1)
                ));
            }
            out.push(line.to_string());
            scanner.consume(line);
        }

        Ok(out.join("\n"))
    }

    fn wrap_errors(&self, code: &str) -> Result<String> {
        Ok(format!("{{\n{}\n}} 2>&1", code))
    }

    fn end_marker_statement(&self) -> String {
        format!("echo \"{}\"", END_OF_EXECUTION)
    }
}

/// Cross-line lexical state of a shell script
#[derive(Debug, Default)]
struct ShellScanner {
    in_single: bool,
    in_double: bool,
    /// Pending here-document terminators, with their `<<-` flag
    heredocs: Vec<(String, bool)>,
    /// Whether the body of the front here-document has started
    heredoc_active: bool,
    paren_depth: usize,
    case_depth: usize,
    continued: bool,
}

impl ShellScanner {
    /// Whether a marker may be placed in front of `line`
    fn starts_command(&self, line: &str) -> bool {
        if self.heredoc_active
            || self.in_single
            || self.in_double
            || self.continued
            || self.paren_depth > 0
        {
            return false;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }

        let first = first_word(trimmed);
        if CLAUSE_WORDS.contains(&first) || trimmed.starts_with(";;") {
            return false;
        }

        !(self.case_depth > 0 && is_case_arm(trimmed))
    }

    /// Advance the state past `line`
    fn consume(&mut self, line: &str) {
        if self.heredoc_active {
            if let Some((word, strip_tabs)) = self.heredocs.first() {
                let candidate = if *strip_tabs {
                    line.trim_start_matches('\t')
                } else {
                    line
                };
                if candidate == word {
                    self.heredocs.remove(0);
                    self.heredoc_active = !self.heredocs.is_empty();
                }
            }
            return;
        }

        let trimmed = line.trim();
        let quoted_at_start = self.in_single || self.in_double;
        if !quoted_at_start && (trimmed.is_empty() || trimmed.starts_with('#')) {
            return;
        }

        let mut body = line;
        if !quoted_at_start {
            let first = first_word(trimmed);
            if first == "case" {
                self.case_depth += 1;
            }
            if self.case_depth > 0 && is_case_arm(trimmed) {
                // Scan only what follows the pattern's closing paren
                if let Some(close) = line.find(')') {
                    body = &line[close + 1..];
                }
            }
        }

        let ends_with_backslash = self.scan(body);

        let code = strip_comment(body);
        let tail = code.trim_end();
        self.continued = ends_with_backslash
            || tail.ends_with('|')
            || tail.ends_with("&&")
            || (tail.ends_with("()") && !tail.ends_with("$()"));

        if !self.in_single && !self.in_double {
            let esacs = code
                .split(|c: char| c.is_whitespace() || c == ';')
                .filter(|word| *word == "esac")
                .count();
            self.case_depth = self.case_depth.saturating_sub(esacs);
        }

        if !self.heredocs.is_empty() && !self.in_single && !self.in_double {
            self.heredoc_active = true;
        }
    }

    /// Track quotes, parens and here-document openers through one line.
    /// Returns whether the line ends in an escaping backslash.
    fn scan(&mut self, line: &str) -> bool {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        let mut previous = ' ';

        while i < chars.len() {
            let c = chars[i];

            if self.in_single {
                if c == '\'' {
                    self.in_single = false;
                }
            } else if self.in_double {
                match c {
                    '\\' => {
                        if i + 1 == chars.len() {
                            return true;
                        }
                        i += 1;
                    }
                    '"' => self.in_double = false,
                    _ => {}
                }
            } else {
                match c {
                    '\\' => {
                        if i + 1 == chars.len() {
                            return true;
                        }
                        i += 1;
                    }
                    '\'' => self.in_single = true,
                    '"' => self.in_double = true,
                    '#' if previous.is_whitespace() || previous == ';' => break,
                    '(' => self.paren_depth += 1,
                    ')' => self.paren_depth = self.paren_depth.saturating_sub(1),
                    '<' if chars.get(i + 1) == Some(&'<') && chars.get(i + 2) != Some(&'<') => {
                        let (word, strip_tabs, next) = heredoc_word(&chars, i + 2);
                        if !word.is_empty() {
                            self.heredocs.push((word, strip_tabs));
                        }
                        i = next;
                        previous = ' ';
                        continue;
                    }
                    '<' if chars.get(i + 1) == Some(&'<') => {
                        // here-string: skip all three
                        i += 3;
                        previous = '<';
                        continue;
                    }
                    _ => {}
                }
            }

            previous = chars[i];
            i += 1;
        }

        false
    }
}

/// Read the delimiter after `<<`; returns (word, `<<-`, index after word)
fn heredoc_word(chars: &[char], mut i: usize) -> (String, bool, usize) {
    let mut strip_tabs = false;
    if chars.get(i) == Some(&'-') {
        strip_tabs = true;
        i += 1;
    }
    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
        i += 1;
    }

    let mut word = String::new();
    while let Some(&c) = chars.get(i) {
        match c {
            '\'' | '"' | '\\' => {}
            c if c.is_whitespace() || matches!(c, ';' | '|' | '&' | '<' | '>' | ')') => break,
            c => word.push(c),
        }
        i += 1;
    }

    (word, strip_tabs, i)
}

fn first_word(trimmed: &str) -> &str {
    trimmed
        .split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .unwrap_or("")
}

fn is_case_arm(trimmed: &str) -> bool {
    CASE_ARM.is_match(trimmed) && !trimmed.starts_with("$(")
}

/// Drop an unquoted trailing comment
fn strip_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut previous = ' ';
    for (index, c) in line.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && (previous.is_whitespace() || previous == ';') => {
                return &line[..index];
            }
            _ => {}
        }
        previous = c;
    }
    line
}
