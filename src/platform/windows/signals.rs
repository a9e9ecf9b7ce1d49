//! Windows signal operations
//!
//! Windows has no POSIX signals; termination goes through `taskkill`.

use crate::error::{Error, Result};
use crate::platform::traits::SignalOps;
use std::process::{Command, Stdio};

pub struct WindowsSignals;

impl WindowsSignals {
    pub fn new() -> Self {
        Self
    }

    fn taskkill(pid: u32, force: bool, label: &str) -> Result<()> {
        let mut command = Command::new("taskkill");
        command.arg("/PID").arg(pid.to_string()).arg("/T");
        if force {
            command.arg("/F");
        }

        let output = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::SignalSendFailed {
                signal: label.to_string(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::SignalSendFailed {
                signal: label.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl SignalOps for WindowsSignals {
    async fn send_interrupt(&self, pid: u32) -> Result<()> {
        // Console ctrl events need a shared console; a piped child has none
        Self::taskkill(pid, false, "Interrupt")
    }

    async fn send_terminate(&self, pid: u32) -> Result<()> {
        Self::taskkill(pid, false, "Terminate")
    }

    async fn send_kill(&self, pid: u32) -> Result<()> {
        Self::taskkill(pid, true, "Kill")
    }

    fn is_process_running(&self, pid: u32) -> bool {
        let output = Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid), "/NH", "/FO", "CSV"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(output) => String::from_utf8_lossy(&output.stdout)
                .contains(&format!("\"{}\"", pid)),
            Err(_) => false,
        }
    }
}
