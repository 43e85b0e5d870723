//! Ctrl-C handling
//!
//! SIGINT sets a flag instead of killing the wrapper. clang-format, being in
//! the same process group, still gets the signal and exits; the pipeline then
//! sees the flag, skips the commit and cleans up its workspace.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT handler. No-op on non-Unix platforms.
pub fn install_handler() {
    #[cfg(unix)]
    install_sigint_handler();
}

#[cfg(unix)]
fn install_sigint_handler() {
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = sigint_handler as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut());
    }
}

/// Whether SIGINT arrived since the handler was installed
#[must_use]
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::Acquire)
}

#[cfg(unix)]
extern "C" fn sigint_handler(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Release);
}
