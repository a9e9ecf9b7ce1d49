//! Windows-specific platform implementations

mod filesystem;
mod runtimes;
mod signals;

pub use filesystem::WindowsFilesystem;
pub use runtimes::WindowsRuntimes;
pub use signals::WindowsSignals;
