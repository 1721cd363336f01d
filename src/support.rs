//! Critical-section support
//!
//! The USB module has no single bit that pauses all of its interrupt
//! sources, so register save/restore sequences are bracketed by the
//! CPU's global interrupt enable instead.

/// Run `f` with maskable interrupts disabled.
#[cfg(target_arch = "msp430")]
pub fn atomic<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    msp430::interrupt::free(|_| f())
}

/// Host build for unit tests: nothing can preempt, run `f` directly.
#[cfg(not(target_arch = "msp430"))]
pub fn atomic<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}
