//! linecast - run code in persistent interpreters and watch it execute
//!
//! This library drives long-lived Python, PowerShell and POSIX shell
//! subprocesses on behalf of a caller (typically a language-model agent),
//! and reports which line of the submitted code is running as it runs.
//!
//! ## How it works
//!
//! - **Instrumentation:** submitted code is rewritten so that it prints an
//!   `##active_line<N>##` marker before each statement, wrapped in a
//!   language-native error handler, and followed by `##end_of_execution##`
//! - **Persistent interpreters:** one subprocess per language, reused across
//!   submissions so state survives between turns
//! - **Classification:** interleaved stdout/stderr lines become ordered
//!   [`LineEvent`]s, projectable to serialisable [`ExecutionChunk`]s
//!
//! ## Module Organization
//!
//! - [`languages`] - Language adapters: instrumentation, wrapping, classification
//! - [`process`] - Interpreter spawning, sessions, turns and the session manager
//! - [`registry`] - Language identifiers, aliases, proper names and file suffixes
//! - [`config`] - Configuration loading and validation
//! - [`models`] - Data structures (Language, LineEvent, CodeRequest, InterpreterProcess)
//! - [`platform`] - Signals, PATH lookup and runtime naming per OS
//! - [`scan`] - Static scanning of code before it runs
//! - [`diagnostics`] - Host and runtime summary
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use linecast::{CodeRequest, Language, SessionManager};
//!
//! # async fn run() -> linecast::Result<()> {
//! let manager = SessionManager::new(linecast::init()?);
//! let mut turn = manager
//!     .execute(CodeRequest::new(Language::Python, "print(1)\nprint(2)"))
//!     .await?;
//!
//! while let Some(chunk) = turn.next_chunk().await {
//!     println!("{:?}", chunk);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! Each interpreter gets two blocking reader threads (stdout, stderr) and one
//! writer thread. Readers push lines into a `tokio::mpsc` channel that the
//! async API pulls from, so the first event is available as soon as its line
//! is printed.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod models;
pub mod platform;

// Core modules
pub mod languages;
pub mod process;
pub mod registry;

// Collaborators
pub mod diagnostics;
pub mod notice;
pub mod scan;

// Re-exports for core functionality
pub use config::Config;
pub use error::{Error, Result};
pub use languages::{adapter_for, LanguageAdapter};
pub use models::{CodeRequest, ExecutionChunk, Language, LineEvent};
pub use process::{ExecutionTurn, InterpreterSession, ProcessKiller, SessionManager};

// Convenience re-exports for common types
pub use config::loader::ConfigLoader;
pub use registry::{LanguageRegistry, LanguageSpec};

/// The current version of linecast from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Load configuration from the standard locations
///
/// Falls back to the defaults when no file is found or the file found cannot
/// be used.
///
/// # Errors
///
/// Returns an error only when the default configuration itself is invalid,
/// for example a `working_directory` that does not exist.
pub fn init() -> Result<Config> {
    info!("Initializing {} v{}", NAME, VERSION);

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Config::default()
        }
    };

    ConfigLoader::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a specific file
pub fn init_with_config(config_path: &std::path::Path) -> Result<Config> {
    info!(
        "Initializing {} v{} with config: {}",
        NAME,
        VERSION,
        config_path.display()
    );

    if !config_path.exists() {
        return Err(Error::ConfigLoadFailed {
            path: config_path.to_path_buf(),
            reason: "Configuration file does not exist".to_string(),
        });
    }

    ConfigLoader::load_from_path(config_path)
}

/// Human-readable explanation of an error, with hints where they help
pub fn handle_startup_error(error: &Error) -> String {
    match error {
        Error::ConfigLoadFailed { path, reason } => {
            format!(
                "Configuration Error: Failed to load config from '{}': {}\n\nTry:\n• Check configuration file syntax\n• Ensure file permissions are correct",
                path.display(),
                reason
            )
        }
        Error::ConfigParseFailed { format, reason } => {
            format!(
                "Configuration Error: Failed to parse {} config: {}",
                format, reason
            )
        }
        Error::ConfigValidationFailed { field, reason } => {
            format!(
                "Configuration Error: Validation failed for '{}': {}",
                field, reason
            )
        }
        Error::ConfigNotFound => "Configuration Error: Config file not found".to_string(),
        Error::InterpreterNotFound {
            language,
            candidates,
        } => {
            format!(
                "No {} interpreter found (tried: {})\n\nTry:\n• Install one of them\n• Set `{}.executable` in the configuration",
                language,
                candidates.join(", "),
                language
            )
        }
        Error::InstrumentationFailed {
            language,
            line,
            message,
        } => {
            format!(
                "The {} code could not be parsed (line {}): {}",
                language, line, message
            )
        }
        _ => format!("Error: {}", error),
    }
}
