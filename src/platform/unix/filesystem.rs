//! Unix filesystem operations

use crate::error::Result;
use crate::platform::traits::FilesystemOps;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct UnixFilesystem;

impl UnixFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl FilesystemOps for UnixFilesystem {
    fn is_executable(&self, path: &Path) -> bool {
        match path.metadata() {
            Ok(metadata) if metadata.is_file() => (metadata.permissions().mode() & 0o111) != 0,
            _ => false,
        }
    }

    fn find_command(&self, command: &str) -> Result<Option<PathBuf>> {
        // Explicit paths are taken as-is
        if command.contains('/') {
            let path = PathBuf::from(command);
            return Ok(self.is_executable(&path).then_some(path));
        }

        match which::which(command) {
            Ok(path) => Ok(Some(path)),
            Err(which::Error::CannotFindBinaryPath) => Ok(None),
            Err(e) => {
                debug!("PATH lookup for '{}' failed: {}", command, e);
                Ok(None)
            }
        }
    }
}
