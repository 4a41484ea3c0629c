/*
 * terminate.rs
 *
 * The actual exit. abort(3), not exit(3): no atexit handlers, no stdio
 * flush, no destructors. SIGABRT goes to whatever the platform has
 * installed (core dump, crash reporter) and if that handler returns, abort
 * still kills the process.
 *
 * exit_group/_exit would also never return, but they look like a clean
 * exit to a supervisor. A fatal error should not.
 */

/// Kill the process. Never returns, never unwinds.
#[cold]
#[inline(never)]
pub fn terminate() -> ! {
    // SAFETY: abort() has no preconditions and never returns.
    unsafe { libc::abort() }
}

/// Aborts if dropped during an unwind.
///
/// Held across anything the boundary calls out to (the notice hook). In a
/// panic=abort build this is dead weight. In an unwinding build it is the
/// only thing standing between a panicking hook and the caller's
/// `catch_unwind`, since unwinding still runs destructors.
///
/// Any drop aborts, unwinding or not. The boundary calls `terminate()` while
/// the guard is still alive, so outside an unwind the drop never runs.
pub struct AbortOnUnwind;

impl Drop for AbortOnUnwind {
    fn drop(&mut self) {
        terminate()
    }
}
