/*
 * panic.rs
 *
 * Rust's own fatal path is panic!, and by default it unwinds. Two ways to
 * point it at the boundary instead:
 *
 *   std hosts:   install_panic_hook(). the previous hook still prints the
 *                panic message, then we abort before unwinding starts. a
 *                catch_unwind further up never sees it.
 *   no_std:      the `panic-handler` feature supplies #[panic_handler].
 *                with panic=abort the compiler rarely reaches it, but it
 *                has to exist to link.
 *
 * Neither is needed for the boundary itself to work. They make it the only
 * fatal path in the process, which is the point.
 */

#[cfg(all(feature = "panic-handler", not(feature = "std"), not(test)))]
use core::panic::PanicInfo;

#[cfg(feature = "std")]
use crate::boundary::{report_fatal, report_fatal_at};
#[cfg(any(feature = "std", all(feature = "panic-handler", not(test))))]
use crate::location::SourceLocation;

/// Make every panic in this process a fatal report.
///
/// Chains the hook that was installed before (by default, the one that
/// prints `thread '...' panicked at ...`), then aborts through the boundary
/// with the panic's location. Call it early in `main`. Calling it twice
/// chains twice, which is harmless: the first pass never returns.
///
/// ```rust,no_run
/// fatal_boundary::install_panic_hook();
/// let _ = std::panic::catch_unwind(|| panic!("boom"));
/// unreachable!("process aborted inside the hook");
/// ```
#[cfg(feature = "std")]
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        previous(info);
        match info.location() {
            Some(loc) => report_fatal_at(info, &SourceLocation::from(loc)),
            None => report_fatal(info),
        }
    }));
}

/// Panic handler for no_std hosts - straight into the boundary.
///
/// No message formatting: the allocator or the formatter may be what
/// panicked. The location is passed along for the notice hook.
#[cfg(all(feature = "panic-handler", not(feature = "std"), not(test)))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    match info.location() {
        Some(loc) => crate::boundary::report_fatal_at(info, &SourceLocation::from(loc)),
        None => crate::boundary::report_fatal(info),
    }
}
