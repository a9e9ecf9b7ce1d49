//! One-time welcome notice
//!
//! The flag is process-wide: false at startup, set on the first display and
//! never reset.

use std::sync::atomic::{AtomicBool, Ordering};

static WELCOMED: AtomicBool = AtomicBool::new(false);

pub const WELCOME_MESSAGE: &str = "Welcome to linecast.\n\n\
Code runs in persistent Python, PowerShell and shell interpreters on this \
machine, with the same access you have. Review code before running it.";

/// The welcome text on the first call, `None` on every later one
pub fn welcome_once() -> Option<&'static str> {
    if WELCOMED.swap(true, Ordering::SeqCst) {
        None
    } else {
        Some(WELCOME_MESSAGE)
    }
}

/// Whether the welcome text has already been handed out
pub fn welcomed() -> bool {
    WELCOMED.load(Ordering::SeqCst)
}
