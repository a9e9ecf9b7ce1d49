//! Interpreter Session
//!
//! One persistent interpreter process bound to one language adapter. A
//! session accepts one submission at a time and turns the raw output of the
//! process into line events.

use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::spawn::spawn_interpreter;
use super::streams::{SessionStreams, SharedTranscript, StreamMessage, Transcript};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::languages::LanguageAdapter;
use crate::models::{InterpreterProcess, Language, LineEvent};
use crate::platform::Platform;

/// How long a terminated interpreter gets to exit before it is killed
const TERMINATE_GRACE: Duration = Duration::from_millis(500);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long to wait for an exit status once both pipes have closed
const REAP_GRACE: Duration = Duration::from_millis(200);

/// Progress of the submission currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Idle,
    Running,
    /// End marker seen; collecting late lines until the stream goes quiet
    Draining,
}

/// A persistent interactive interpreter
#[derive(Debug)]
pub struct InterpreterSession {
    id: Uuid,
    adapter: Box<dyn LanguageAdapter>,
    process: InterpreterProcess,
    child: Child,
    streams: SessionStreams,
    transcript: SharedTranscript,
    drain_grace: Duration,
    turn: TurnState,
    needs_restart: bool,
    /// Shared with kill handles; cleared once the process is gone
    alive: Arc<AtomicBool>,
}

impl InterpreterSession {
    /// Launch the adapter's interpreter
    pub fn start(adapter: Box<dyn LanguageAdapter>, config: &SessionConfig) -> Result<Self> {
        let transcript = Transcript::shared(config.transcript_limit);
        let (child, process, streams) =
            spawn_interpreter(adapter.launch_command(), config, transcript.clone())?;

        let id = Uuid::new_v4();
        info!(
            "Started {} session {} ({}) with pid {}",
            adapter.language(),
            id,
            adapter.name(),
            child.id()
        );

        Ok(Self {
            id,
            adapter,
            process,
            child,
            streams,
            transcript,
            drain_grace: Duration::from_millis(config.drain_grace_ms),
            turn: TurnState::Idle,
            needs_restart: false,
            alive: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Unique id of this session, for logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> Language {
        self.adapter.language()
    }

    pub fn adapter(&self) -> &dyn LanguageAdapter {
        self.adapter.as_ref()
    }

    pub fn process(&self) -> &InterpreterProcess {
        &self.process
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Whether a submission is in flight
    pub fn is_busy(&self) -> bool {
        self.turn != TurnState::Idle
    }

    /// Whether the process is gone or unusable and must be replaced
    pub fn needs_restart(&self) -> bool {
        self.needs_restart
    }

    /// Check that the process is still running, picking up an exit that
    /// happened between turns
    pub fn is_alive(&mut self) -> bool {
        if self.needs_restart {
            return false;
        }

        self.streams.drain_pending();
        let exited = self.streams.all_closed() || !matches!(self.child.try_wait(), Ok(None));
        if exited {
            self.mark_dead();
        }
        !exited
    }

    /// Snapshot of everything the process has printed, markers included
    pub fn transcript(&self) -> String {
        self.transcript
            .lock()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default()
    }

    /// Transcript handle readable without holding the session
    pub fn shared_transcript(&self) -> SharedTranscript {
        self.transcript.clone()
    }

    /// Handle that can kill the process while a turn holds the session
    pub fn kill_handle(&self) -> ProcessKiller {
        ProcessKiller {
            language: self.language(),
            pid: self.child.id(),
            alive: self.alive.clone(),
        }
    }

    /// Instrument `code` and write it to the interpreter.
    ///
    /// Instrumentation errors are returned before anything is written.
    pub fn submit(&mut self, code: &str) -> Result<()> {
        let language = self.language();

        if self.is_busy() {
            return Err(Error::ExecutionInProgress {
                language: language.to_string(),
            });
        }
        if !self.is_alive() {
            return Err(Error::SessionTerminated {
                language: language.to_string(),
            });
        }

        let program = self.adapter.preprocess(code)?;

        let stale = self.streams.drain_pending();
        if stale > 0 {
            debug!("Dropped {} stale {} output lines", stale, language);
        }

        let mut data = program.into_bytes();
        data.push(b'\n');
        if let Err(e) = self.streams.write(&data) {
            self.mark_dead();
            return Err(e);
        }

        debug!("Submitted {} bytes to {} session", data.len(), language);
        self.turn = TurnState::Running;
        Ok(())
    }

    /// Next event of the current turn.
    ///
    /// Returns `None` when no turn is in flight. The last event of a turn is
    /// always `EndOfExecution` or `Fault`.
    pub async fn next_event(&mut self) -> Option<LineEvent> {
        loop {
            let message = match self.turn {
                TurnState::Idle => return None,
                TurnState::Running => self.streams.recv().await,
                TurnState::Draining => {
                    match tokio::time::timeout(self.drain_grace, self.streams.recv()).await {
                        Ok(message) => message,
                        Err(_) => return Some(self.finish_turn()),
                    }
                }
            };

            match message {
                Some(StreamMessage::Line { source, text }) => {
                    match self.adapter.classify_output(&text, source) {
                        LineEvent::Discard => {}
                        LineEvent::EndOfExecution if self.turn == TurnState::Running => {
                            if self.drain_grace.is_zero() {
                                return Some(self.finish_turn());
                            }
                            self.turn = TurnState::Draining;
                        }
                        // Markers after the end marker belong to nothing
                        LineEvent::EndOfExecution | LineEvent::ActiveLine(_)
                            if self.turn == TurnState::Draining => {}
                        event => return Some(event),
                    }
                }
                Some(StreamMessage::Closed(source)) => {
                    debug!("{} {} closed", self.language(), source);
                    if self.streams.all_closed() {
                        return Some(self.exited().await);
                    }
                }
                Some(StreamMessage::WriteFailed(reason)) => {
                    return Some(self.fault(format!("failed to write to interpreter: {}", reason)));
                }
                None => return Some(self.exited().await),
            }
        }
    }

    /// Give up on the current turn and the process with it
    pub fn abandon(&mut self) {
        if self.turn == TurnState::Idle {
            return;
        }
        warn!(
            "{} turn dropped before completion, killing interpreter",
            self.language()
        );
        self.turn = TurnState::Idle;
        self.kill_now();
    }

    /// Stop the interpreter: terminate signal, short grace period, then kill
    pub async fn terminate(&mut self) -> Result<()> {
        if self.process.is_terminated() {
            return Ok(());
        }

        let pid = self.pid();
        if let Err(e) = Platform::signals().send_terminate(pid).await {
            debug!("Terminate signal to {} failed: {}", pid, e);
        }

        let deadline = tokio::time::Instant::now() + TERMINATE_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.process.mark_terminated(status.code());
                    break;
                }
                Ok(None) if tokio::time::Instant::now() < deadline => {
                    tokio::time::sleep(EXIT_POLL_INTERVAL).await;
                }
                _ => {
                    self.kill_now();
                    break;
                }
            }
        }

        self.turn = TurnState::Idle;
        self.mark_dead();
        info!("Terminated {} session ({})", self.language(), self.process);
        Ok(())
    }

    fn finish_turn(&mut self) -> LineEvent {
        self.turn = TurnState::Idle;
        LineEvent::EndOfExecution
    }

    /// Both output streams hit EOF: the process is gone
    async fn exited(&mut self) -> LineEvent {
        if self.turn == TurnState::Draining {
            // The code ran to its end marker; only the process went away after
            self.mark_dead();
            self.reap();
            return self.finish_turn();
        }

        self.reap_within(REAP_GRACE).await;
        let reason = match self.process.exit_code {
            Some(code) => format!("interpreter exited with status {}", code),
            None => "interpreter exited".to_string(),
        };
        self.fault(reason)
    }

    fn fault(&mut self, reason: String) -> LineEvent {
        warn!("{} session fault: {}", self.language(), reason);
        self.turn = TurnState::Idle;
        self.mark_dead();
        LineEvent::Fault(reason)
    }

    fn mark_dead(&mut self) {
        self.needs_restart = true;
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Collect the exit status if the process already exited
    fn reap(&mut self) {
        if let Ok(Some(status)) = self.child.try_wait() {
            self.process.mark_terminated(status.code());
        }
    }

    /// Poll for the exit status for at most `grace`.
    /// The pipes close a moment before the process can be waited on.
    async fn reap_within(&mut self, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            self.reap();
            if self.process.is_terminated() || tokio::time::Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    fn kill_now(&mut self) {
        self.mark_dead();
        if self.process.is_terminated() {
            return;
        }
        if let Err(e) = self.child.kill() {
            debug!("Kill of {} failed: {}", self.pid(), e);
        }
        let code = self.child.wait().ok().and_then(|status| status.code());
        self.process.mark_terminated(code);
    }
}

impl Drop for InterpreterSession {
    fn drop(&mut self) {
        self.kill_now();
    }
}

/// Out-of-band handle that stops an interpreter while a turn is running.
///
/// The running turn then ends with a `Fault`.
#[derive(Debug, Clone)]
pub struct ProcessKiller {
    language: Language,
    pid: u32,
    alive: Arc<AtomicBool>,
}

impl ProcessKiller {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the owning session still considers the process usable
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Forcefully kill the process
    pub async fn kill(&self) -> Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        info!("Killing {} interpreter (pid {})", self.language, self.pid);
        Platform::signals().send_kill(self.pid).await
    }

    /// Send an interrupt, the equivalent of Ctrl+C
    pub async fn interrupt(&self) -> Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        debug!("Interrupting {} interpreter (pid {})", self.language, self.pid);
        Platform::signals().send_interrupt(self.pid).await
    }
}
