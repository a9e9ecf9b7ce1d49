//! Interpreter Process Model
//!
//! Lifecycle metadata of one interpreter subprocess. The OS handle itself
//! lives in the session; this model only records what happened to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the state of an interpreter process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProcessState {
    /// Process has been described but not started
    #[default]
    Created,
    /// Process is currently running
    Running,
    /// Process has terminated
    Terminated,
}

/// Lifecycle record of an interpreter subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterProcess {
    /// OS process identifier
    pub pid: Option<u32>,

    /// Current state of the process
    pub state: ProcessState,

    /// When the process was started
    pub start_time: Option<DateTime<Utc>>,

    /// When the process terminated (if applicable)
    pub end_time: Option<DateTime<Utc>>,

    /// Exit code (if the process terminated and reported one)
    pub exit_code: Option<i32>,

    /// Program that was executed
    pub command: String,

    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl InterpreterProcess {
    /// Create a new process record in the Created state
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self {
            pid: None,
            state: ProcessState::Created,
            start_time: None,
            end_time: None,
            exit_code: None,
            command,
            args,
        }
    }

    /// Mark the process as started with the given PID
    pub fn mark_started(&mut self, pid: u32) {
        self.pid = Some(pid);
        self.state = ProcessState::Running;
        self.start_time = Some(Utc::now());
    }

    /// Mark the process as terminated; the exit code is unknown when killed by a signal
    pub fn mark_terminated(&mut self, exit_code: Option<i32>) {
        if self.is_terminated() {
            return;
        }
        self.state = ProcessState::Terminated;
        self.end_time = Some(Utc::now());
        self.exit_code = exit_code;
    }

    /// Check if the process is currently running
    pub fn is_running(&self) -> bool {
        matches!(self.state, ProcessState::Running)
    }

    /// Check if the process has terminated
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ProcessState::Terminated)
    }

    /// Get the lifetime of the process if it has terminated
    pub fn lifetime(&self) -> Option<std::time::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                Some(end.signed_duration_since(start).to_std().unwrap_or_default())
            }
            _ => None,
        }
    }

    /// Full command line for logs and diagnostics
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

impl Default for InterpreterProcess {
    fn default() -> Self {
        Self::new(String::new(), Vec::new())
    }
}

impl std::fmt::Display for InterpreterProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state_str = match self.state {
            ProcessState::Created => "Created",
            ProcessState::Running => "Running",
            ProcessState::Terminated => "Terminated",
        };
        let pid_str = self.pid.map_or("N/A".to_string(), |pid| pid.to_string());

        write!(f, "{} [{}] - {}", self.command_line(), pid_str, state_str)?;
        if let Some(code) = self.exit_code {
            write!(f, " (exit: {})", code)?;
        }
        Ok(())
    }
}
