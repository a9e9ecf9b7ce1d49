//! Error types and Result aliases for linecast

use std::fmt;
use std::path::PathBuf;

/// Result type alias for linecast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for linecast
#[derive(Debug)]
pub enum Error {
    // === Instrumentation errors ===
    /// Submitted code could not be parsed into a statement tree
    InstrumentationFailed {
        language: String,
        line: usize,
        message: String,
    },

    // === Interpreter process errors ===
    /// No runtime binary could be found for a language
    InterpreterNotFound {
        language: String,
        candidates: Vec<String>,
    },

    /// Failed to spawn the interpreter process
    SpawnFailed {
        command: String,
        reason: String,
    },

    /// A standard stream of the child could not be captured
    PipeUnavailable {
        stream: String,
    },

    /// Failed to hand input to the interpreter's stdin writer
    InputSendFailed {
        reason: String,
    },

    /// A turn is already in flight for this language
    ExecutionInProgress {
        language: String,
    },

    /// The interpreter process is gone and the session must be recreated
    SessionTerminated {
        language: String,
    },

    /// Failed to send signal to process
    SignalSendFailed {
        signal: String,
        reason: String,
    },

    // === Language errors ===
    /// Language identifier not present in the registry
    UnknownLanguage {
        name: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === Collaborator errors ===
    /// Static scan could not be run
    ScanFailed {
        language: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    /// Regex compilation errors
    Regex(regex::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl Error {
    /// Whether the error means the owning session has to be recreated
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Error::SessionTerminated { .. } | Error::InputSendFailed { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Instrumentation errors
            Error::InstrumentationFailed {
                language,
                line,
                message,
            } => {
                write!(
                    f,
                    "Could not instrument {} code (line {}): {}",
                    language, line, message
                )
            }

            // Interpreter process errors
            Error::InterpreterNotFound {
                language,
                candidates,
            } => {
                write!(
                    f,
                    "No {} interpreter found (tried: {})",
                    language,
                    candidates.join(", ")
                )
            }
            Error::SpawnFailed { command, reason } => {
                write!(f, "Failed to spawn interpreter '{}': {}", command, reason)
            }
            Error::PipeUnavailable { stream } => {
                write!(f, "Interpreter {} is not piped", stream)
            }
            Error::InputSendFailed { reason } => {
                write!(f, "Failed to send input to interpreter: {}", reason)
            }
            Error::ExecutionInProgress { language } => {
                write!(f, "A {} execution is already in progress", language)
            }
            Error::SessionTerminated { language } => {
                write!(f, "The {} interpreter has terminated", language)
            }
            Error::SignalSendFailed { signal, reason } => {
                write!(f, "Failed to send signal '{}': {}", signal, reason)
            }

            // Language errors
            Error::UnknownLanguage { name } => {
                write!(f, "Unknown language: '{}'", name)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // Collaborator errors
            Error::ScanFailed { language, reason } => {
                write!(f, "Could not scan {} code: {}", language, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),
            Error::Regex(err) => write!(f, "Regex compilation error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Toml(err) => Some(err),
            Error::Regex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Regex(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
