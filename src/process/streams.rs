//! Session Streams
//!
//! Bridges the blocking reader and writer threads of an interpreter to async
//! code through channels, and keeps the bounded session transcript.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::mpsc::Sender as StdSender;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// Which standard stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::Stdout => f.write_str("stdout"),
            StreamSource::Stderr => f.write_str("stderr"),
        }
    }
}

/// Message pushed by the I/O threads of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// One line, terminator stripped
    Line { source: StreamSource, text: String },
    /// The stream reached EOF or failed for good
    Closed(StreamSource),
    /// The stdin writer gave up
    WriteFailed(String),
}

/// Cumulative output of a session, capped at `limit` bytes.
///
/// When the cap is exceeded the oldest bytes are dropped, cutting on a
/// character boundary.
#[derive(Debug, Clone)]
pub struct Transcript {
    text: String,
    limit: usize,
}

/// Transcript shared between the reader threads and consumers
pub type SharedTranscript = Arc<Mutex<Transcript>>;

impl Transcript {
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    /// Create a transcript ready to be handed to reader threads
    pub fn shared(limit: usize) -> SharedTranscript {
        Arc::new(Mutex::new(Self::new(limit)))
    }

    /// Append a line and its terminator
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');

        if self.text.len() > self.limit {
            let mut cut = self.text.len() - self.limit;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Input and output channels of one interpreter session
pub struct SessionStreams {
    /// Lines and lifecycle notices from the I/O threads
    output_rx: UnboundedReceiver<StreamMessage>,
    /// Bytes for the stdin writer thread
    input_tx: StdSender<Vec<u8>>,
    stdout_open: bool,
    stderr_open: bool,
}

impl SessionStreams {
    /// Create new session streams from channels
    pub fn from_channels(
        output_rx: UnboundedReceiver<StreamMessage>,
        input_tx: StdSender<Vec<u8>>,
    ) -> Self {
        Self {
            output_rx,
            input_tx,
            stdout_open: true,
            stderr_open: true,
        }
    }

    /// Queue data for the interpreter's stdin
    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.input_tx
            .send(data.to_vec())
            .map_err(|e| Error::InputSendFailed {
                reason: e.to_string(),
            })
    }

    /// Wait for the next message; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<StreamMessage> {
        let message = self.output_rx.recv().await;
        if let Some(message) = &message {
            self.note(message);
        }
        message
    }

    /// Discard everything already queued, returning the number of lines
    /// thrown away. Closure notices are still recorded.
    pub fn drain_pending(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.output_rx.try_recv() {
                Ok(message) => {
                    self.note(&message);
                    if matches!(message, StreamMessage::Line { .. }) {
                        count += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.stdout_open = false;
                    self.stderr_open = false;
                    break;
                }
            }
        }
        count
    }

    /// Whether both output streams have reached EOF
    pub fn all_closed(&self) -> bool {
        !self.stdout_open && !self.stderr_open
    }

    fn note(&mut self, message: &StreamMessage) {
        match message {
            StreamMessage::Closed(StreamSource::Stdout) => self.stdout_open = false,
            StreamMessage::Closed(StreamSource::Stderr) => self.stderr_open = false,
            _ => {}
        }
    }
}

impl fmt::Debug for SessionStreams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStreams")
            .field("stdout_open", &self.stdout_open)
            .field("stderr_open", &self.stderr_open)
            .finish()
    }
}
