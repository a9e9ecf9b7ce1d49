//! Line Event Model
//!
//! The result of classifying one line of interpreter output, and the
//! serialisable projection handed to callers.

use serde::{Deserialize, Serialize};

/// Classification of a single interpreter output line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LineEvent {
    /// The statement on this 1-based source line is about to run
    ActiveLine(usize),
    /// The submitted code finished (normally or through a caught error)
    EndOfExecution,
    /// Ordinary output produced by the code, without its line terminator
    OutputText(String),
    /// Interpreter noise such as prompt echoes
    Discard,
    /// The interpreter process died mid-turn.
    ///
    /// Never produced by a classifier; the driver emits it as the terminal
    /// event of a turn whose subprocess went away.
    Fault(String),
}

impl LineEvent {
    /// Whether this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, LineEvent::EndOfExecution | LineEvent::Fault(_))
    }

    /// Active line number, if this is a marker event
    pub fn active_line(&self) -> Option<usize> {
        match self {
            LineEvent::ActiveLine(line) => Some(*line),
            _ => None,
        }
    }

    /// Output text, if this is an output event
    pub fn output_text(&self) -> Option<&str> {
        match self {
            LineEvent::OutputText(text) => Some(text),
            _ => None,
        }
    }
}

/// Caller-facing projection of a [`LineEvent`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionChunk {
    /// Line that is about to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_line: Option<usize>,
    /// Output delta, newline-terminated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Subprocess-level fault description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the turn is over
    pub done: bool,
}

impl ExecutionChunk {
    /// Project an event; `Discard` has no projection
    pub fn from_event(event: &LineEvent) -> Option<Self> {
        let chunk = match event {
            LineEvent::ActiveLine(line) => ExecutionChunk {
                active_line: Some(*line),
                ..Default::default()
            },
            LineEvent::OutputText(text) => ExecutionChunk {
                output: Some(format!("{}\n", text)),
                ..Default::default()
            },
            LineEvent::EndOfExecution => ExecutionChunk {
                done: true,
                ..Default::default()
            },
            LineEvent::Fault(reason) => ExecutionChunk {
                error: Some(reason.clone()),
                done: true,
                ..Default::default()
            },
            LineEvent::Discard => return None,
        };
        Some(chunk)
    }
}
