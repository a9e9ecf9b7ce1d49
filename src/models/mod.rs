//! Core data models for linecast
//!
//! Languages, code requests, classified output lines, and interpreter
//! process records.

pub mod code_request;
pub mod interpreter_process;
pub mod language;
pub mod line_event;

// Re-exports for convenience
pub use code_request::CodeRequest;
pub use interpreter_process::{InterpreterProcess, ProcessState};
pub use language::Language;
pub use line_event::{ExecutionChunk, LineEvent};
