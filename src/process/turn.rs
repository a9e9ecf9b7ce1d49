//! Execution Turn
//!
//! The scope of one submission: code goes in, events come out until
//! `EndOfExecution` or `Fault`. A turn holds its session exclusively for its
//! whole lifetime.

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use super::session::{InterpreterSession, ProcessKiller};
use crate::error::Result;
use crate::models::{ExecutionChunk, Language, LineEvent};

/// Exclusive, single-use view of a session's output for one submission
pub struct ExecutionTurn {
    session: OwnedMutexGuard<InterpreterSession>,
    killer: ProcessKiller,
    finished: bool,
}

/// Everything a finished turn produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnOutput {
    /// Output lines joined with `\n`, each line terminated
    pub output: String,
    /// Active lines in execution order
    pub active_lines: Vec<usize>,
    /// Set when the interpreter died mid-turn
    pub fault: Option<String>,
}

impl ExecutionTurn {
    /// Submit `code` on a locked session
    pub fn begin(mut session: OwnedMutexGuard<InterpreterSession>, code: &str) -> Result<Self> {
        session.submit(code)?;
        let killer = session.kill_handle();
        Ok(Self {
            session,
            killer,
            finished: false,
        })
    }

    pub fn language(&self) -> Language {
        self.killer.language()
    }

    /// Handle for stopping the interpreter from elsewhere
    pub fn killer(&self) -> ProcessKiller {
        self.killer.clone()
    }

    /// Whether the terminal event has been delivered
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next event; `None` after the terminal one
    pub async fn next(&mut self) -> Option<LineEvent> {
        if self.finished {
            return None;
        }

        match self.session.next_event().await {
            Some(event) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Some(event)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    /// Next caller-facing chunk, skipping discarded lines
    pub async fn next_chunk(&mut self) -> Option<ExecutionChunk> {
        loop {
            let event = self.next().await?;
            if let Some(chunk) = ExecutionChunk::from_event(&event) {
                return Some(chunk);
            }
        }
    }

    /// The remaining events as a stream
    pub fn into_stream(self) -> impl Stream<Item = LineEvent> {
        stream::unfold(self, |mut turn| async move {
            let event = turn.next().await?;
            Some((event, turn))
        })
    }

    /// The remaining events projected to chunks
    pub fn into_chunks(self) -> impl Stream<Item = ExecutionChunk> {
        self.into_stream()
            .filter_map(|event| async move { ExecutionChunk::from_event(&event) })
    }

    /// Run the turn to completion and gather its output
    pub async fn collect_output(mut self) -> TurnOutput {
        let mut collected = TurnOutput::default();
        while let Some(event) = self.next().await {
            match event {
                LineEvent::ActiveLine(line) => collected.active_lines.push(line),
                LineEvent::OutputText(text) => {
                    collected.output.push_str(&text);
                    collected.output.push('\n');
                }
                LineEvent::Fault(reason) => collected.fault = Some(reason),
                LineEvent::EndOfExecution | LineEvent::Discard => {}
            }
        }
        collected
    }
}

impl Drop for ExecutionTurn {
    fn drop(&mut self) {
        if !self.finished {
            self.session.abandon();
        }
    }
}

impl std::fmt::Debug for ExecutionTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionTurn")
            .field("language", &self.language())
            .field("pid", &self.killer.pid())
            .field("finished", &self.finished)
            .finish()
    }
}
