//! Signal handling for graceful shutdown.
//!
//! A single Ctrl+C sets a shared `AtomicBool`; the walker stops yielding
//! entries, no new hash jobs are scheduled, and in-flight hashes abort at
//! their next chunk boundary. The application then exits with code 130
//! (128 + SIGINT).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Centralized shutdown flag for graceful termination.
///
/// `Send + Sync`; clone the inner flag with [`get_flag`](Self::get_flag) and
/// hand it to the finder, walker and hasher.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the flag for passing to worker threads.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Install the Ctrl+C handler and return its shutdown handle.
///
/// # Errors
///
/// Fails if a handler is already installed for this process.
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();
    ctrlc::set_handler(move || {
        // First signal requests cleanup; worker threads observe the flag
        flag.store(true, Ordering::SeqCst);
        eprintln!("Interrupted. Cleaning up...");
    })?;
    log::debug!("Signal handler installed");
    Ok(handler)
}
