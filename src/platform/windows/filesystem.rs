//! Windows filesystem operations

use crate::error::Result;
use crate::platform::traits::FilesystemOps;
use std::path::{Path, PathBuf};

pub struct WindowsFilesystem;

impl WindowsFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl FilesystemOps for WindowsFilesystem {
    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| {
                    matches!(
                        ext.to_lowercase().as_str(),
                        "exe" | "bat" | "cmd" | "com"
                    )
                })
                .unwrap_or(false)
    }

    fn find_command(&self, command: &str) -> Result<Option<PathBuf>> {
        if command.contains('\\') || command.contains('/') {
            let path = PathBuf::from(command);
            return Ok(self.is_executable(&path).then_some(path));
        }

        // `which` applies PATHEXT, so "pwsh" finds "pwsh.exe"
        match which::which(command) {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                debug!("PATH lookup for '{}' failed: {}", command, e);
                Ok(None)
            }
        }
    }
}
