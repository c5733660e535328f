//! Interrupt notification.
//!
//! The Ctrl+C handler only raises a flag. The header fetch loop and the
//! review loop check it between blocking waits and leave through their
//! normal teardown, so `QUIT` and terminal restore never run inside the
//! handler. A blocked read (a stalled server, the import prompt) delays
//! that check, so a second Ctrl+C ends the process on the spot; the server
//! then discards any pending deletions, as it does for any dropped
//! connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status after a forced second interrupt (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Shared "stop as soon as convenient" flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag and report whether it was already raised.
    fn raise_again(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    /// Route SIGINT (Ctrl+C outside raw mode) to this flag. A second
    /// SIGINT exits with status 130.
    ///
    /// Only one handler can be installed per process.
    pub fn install_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            if flag.raise_again() {
                std::process::exit(EXIT_INTERRUPTED);
            }
            eprintln!("\nInterrupted, finishing the current request (Ctrl+C again to quit now)");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let seen_by_handler = flag.clone();
        assert!(!flag.is_cancelled());
        seen_by_handler.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_second_raise_is_reported() {
        let flag = CancelFlag::new();
        assert!(!flag.raise_again());
        assert!(flag.is_cancelled());
        assert!(flag.raise_again());
    }

    #[test]
    fn test_key_cancel_then_signal_counts_as_second() {
        let flag = CancelFlag::new();
        flag.cancel();
        assert!(flag.clone().raise_again());
    }

    #[test]
    fn test_raised_from_another_thread() {
        let flag = CancelFlag::new();
        let remote = flag.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(flag.is_cancelled());
    }
}
