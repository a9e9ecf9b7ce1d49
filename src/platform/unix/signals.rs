//! Unix signal operations
//!
//! Interpreters are spawned as process-group leaders, so signals go to the
//! whole group and reach commands the interpreter started.

use crate::error::{Error, Result};
use crate::platform::traits::SignalOps;
use nix::sys::signal::{kill, killpg, Signal as NixSignal};
use nix::unistd::Pid;

pub struct UnixSignals;

impl UnixSignals {
    pub fn new() -> Self {
        Self
    }

    fn send(pid: u32, signal: NixSignal) -> Result<()> {
        trace!("Sending {} to pid {}", signal, pid);
        kill(Pid::from_raw(pid as i32), signal).map_err(|e| Error::SignalSendFailed {
            signal: signal.to_string(),
            reason: e.to_string(),
        })
    }

    /// Signal the group led by `pid`, or `pid` alone when it leads none
    fn send_group(pid: u32, signal: NixSignal) -> Result<()> {
        match killpg(Pid::from_raw(pid as i32), signal) {
            Ok(()) => {
                trace!("Sent {} to process group {}", signal, pid);
                Ok(())
            }
            Err(_) => Self::send(pid, signal),
        }
    }
}

#[async_trait::async_trait]
impl SignalOps for UnixSignals {
    async fn send_interrupt(&self, pid: u32) -> Result<()> {
        Self::send_group(pid, NixSignal::SIGINT)
    }

    async fn send_terminate(&self, pid: u32) -> Result<()> {
        Self::send_group(pid, NixSignal::SIGTERM)
    }

    async fn send_kill(&self, pid: u32) -> Result<()> {
        Self::send_group(pid, NixSignal::SIGKILL)
    }

    fn is_process_running(&self, pid: u32) -> bool {
        // Null signal: existence and permission check only
        kill(Pid::from_raw(pid as i32), None).is_ok()
    }
}
