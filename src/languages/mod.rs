//! Language adapters
//!
//! An adapter knows how to make code of one language report its own
//! progress, how to keep a runtime error from killing the interpreter, how to
//! launch that interpreter, and how to read the lines it prints back.
//!
//! Adapters are picked once per session by [`adapter_for`] and never change
//! afterwards; a missing PowerShell on a non-Windows host is resolved here by
//! handing out the POSIX shell adapter instead.

pub mod markers;
pub mod posix;
pub mod powershell;
pub mod python;

use crate::config::{Config, InterpreterConfig};
use crate::error::{Error, Result};
use crate::models::{Language, LineEvent};
use crate::platform::Platform;
use crate::process::StreamSource;
use std::fmt;
use std::path::PathBuf;

pub use posix::PosixShellAdapter;
pub use powershell::PowerShellAdapter;
pub use python::PythonAdapter;

/// Program and arguments that start an interactive interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Resolved executable
    pub program: PathBuf,
    /// Flags passed on every launch
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Per-language code transformation and output classification
pub trait LanguageAdapter: Send + Sync + fmt::Debug {
    /// Language this adapter serves
    fn language(&self) -> Language;

    /// Short name of the concrete adapter, for logs and diagnostics
    fn name(&self) -> &'static str;

    /// How to start the interpreter
    fn launch_command(&self) -> &LaunchCommand;

    /// Insert an active-line marker before each executable line
    fn instrument(&self, code: &str) -> Result<String>;

    /// Wrap code in a blanket handler that prints errors instead of dying
    fn wrap_errors(&self, code: &str) -> Result<String>;

    /// Statement that prints the end-of-execution sentinel
    fn end_marker_statement(&self) -> String;

    /// Classify one line of interpreter output
    fn classify_line(&self, line: &str) -> LineEvent {
        markers::classify(line)
    }

    /// Classify a line read from `source`
    fn classify_output(&self, line: &str, _source: StreamSource) -> LineEvent {
        self.classify_line(line)
    }

    /// Reject code the interpreter could not parse.
    /// Adapters whose instrumentation already parses the code keep the default.
    fn check_syntax(&self, _code: &str) -> Result<()> {
        Ok(())
    }

    /// Instrument, wrap, and append the end-of-execution statement
    ///
    /// The sentinel sits outside the protected body after a blank line, which
    /// closes any open compound statement in interactive interpreters.
    fn preprocess(&self, code: &str) -> Result<String> {
        self.check_syntax(code)?;
        let instrumented = self.instrument(code)?;
        let wrapped = self.wrap_errors(&instrumented)?;
        Ok(format!(
            "{}\n\n{}",
            wrapped.trim_end_matches('\n'),
            self.end_marker_statement()
        ))
    }
}

/// Build the adapter for `language`, resolving its runtime up front
pub fn adapter_for(language: Language, config: &Config) -> Result<Box<dyn LanguageAdapter>> {
    let runtimes = Platform::runtimes();

    match language {
        Language::Python => {
            let program = resolve_runtime(
                language,
                &config.python,
                &runtimes.candidates(Language::Python),
            )?;
            Ok(Box::new(PythonAdapter::new(LaunchCommand::new(
                program,
                config.python.args_or(python::DEFAULT_ARGS),
            ))))
        }
        Language::PowerShell => {
            let resolved = resolve_runtime(
                language,
                &config.powershell,
                &runtimes.candidates(Language::PowerShell),
            );
            match resolved {
                Ok(program) => Ok(Box::new(PowerShellAdapter::new(LaunchCommand::new(
                    program,
                    config.powershell.args_or(powershell::DEFAULT_ARGS),
                )))),
                Err(Error::InterpreterNotFound { .. })
                    if runtimes.powershell_falls_back_to_shell() =>
                {
                    info!("PowerShell not found, falling back to the POSIX shell");
                    let program = resolve_runtime(
                        language,
                        &config.shell,
                        &runtimes.candidates(Language::Shell),
                    )?;
                    Ok(Box::new(PosixShellAdapter::new(
                        language,
                        LaunchCommand::new(program, config.shell.args_or(posix::DEFAULT_ARGS)),
                    )))
                }
                Err(e) => Err(e),
            }
        }
        Language::Shell => {
            let program = resolve_runtime(
                language,
                &config.shell,
                &runtimes.candidates(Language::Shell),
            )?;
            Ok(Box::new(PosixShellAdapter::new(
                language,
                LaunchCommand::new(program, config.shell.args_or(posix::DEFAULT_ARGS)),
            )))
        }
    }
}

/// Resolve the executable for a language: configured path first, then PATH
pub fn resolve_runtime(
    language: Language,
    interpreter: &InterpreterConfig,
    candidates: &[&str],
) -> Result<PathBuf> {
    let fs = Platform::filesystem();

    let tried: Vec<String> = match &interpreter.executable {
        Some(executable) => vec![executable.to_string_lossy().into_owned()],
        None => candidates.iter().map(|c| c.to_string()).collect(),
    };

    for candidate in &tried {
        if let Some(path) = fs.find_command(candidate)? {
            debug!("Resolved {} runtime to {}", language, path.display());
            return Ok(path);
        }
    }

    Err(Error::InterpreterNotFound {
        language: language.to_string(),
        candidates: tried,
    })
}
