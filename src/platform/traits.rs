//! Operations that differ between OS families
//!
//! Sessions only ever talk to these traits; `Platform` hands out the
//! implementation for the host.

use crate::error::Result;
use crate::models::Language;
use std::path::{Path, PathBuf};

/// Delivering signals to interpreter processes
#[async_trait::async_trait]
pub trait SignalOps: Send + Sync {
    /// Interrupt the running code (SIGINT / Ctrl+C)
    async fn send_interrupt(&self, pid: u32) -> Result<()>;

    /// Ask the interpreter to exit
    async fn send_terminate(&self, pid: u32) -> Result<()>;

    /// Kill the interpreter and everything it started
    async fn send_kill(&self, pid: u32) -> Result<()>;

    /// Whether `pid` still refers to a live process
    fn is_process_running(&self, pid: u32) -> bool;
}

/// Locating interpreter executables
pub trait FilesystemOps: Send + Sync {
    /// Whether `path` is a file the current user may execute
    fn is_executable(&self, path: &Path) -> bool;

    /// Resolve a bare name through PATH, or check an explicit path
    fn find_command(&self, command: &str) -> Result<Option<PathBuf>>;
}

/// Interpreter naming conventions of the host
pub trait RuntimeOps: Send + Sync {
    /// Executable names tried on PATH for a language, in order
    fn candidates(&self, language: Language) -> Vec<&'static str>;

    /// Whether a missing PowerShell is replaced by the POSIX shell
    fn powershell_falls_back_to_shell(&self) -> bool;
}
