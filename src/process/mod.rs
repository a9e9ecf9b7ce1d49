//! Interactive process driver
//!
//! Spawns persistent interpreters, feeds them instrumented code and turns
//! their interleaved stdout/stderr into ordered line events.

pub mod manager;
pub mod session;
pub mod spawn;
pub mod streams;
pub mod turn;

pub use manager::SessionManager;
pub use session::{InterpreterSession, ProcessKiller};
pub use spawn::spawn_interpreter;
pub use streams::{SessionStreams, SharedTranscript, StreamMessage, StreamSource, Transcript};
pub use turn::{ExecutionTurn, TurnOutput};
