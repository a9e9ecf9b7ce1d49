//! Unix-specific platform implementations

mod filesystem;
mod runtimes;
mod signals;

pub use filesystem::UnixFilesystem;
pub use runtimes::UnixRuntimes;
pub use signals::UnixSignals;
