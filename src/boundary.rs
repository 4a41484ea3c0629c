/*
 * boundary.rs
 *
 * The two entry points. Both end in abort(), both are `-> !`, neither looks
 * at the payload. That's the whole contract.
 *
 * Order of events on a call:
 *   1. arm AbortOnUnwind, so nothing below can unwind out of here
 *   2. first caller only: run the notice hook, if installed
 *   3. abort()
 *
 * There is deliberately no path from here back into panic!() or any other
 * reporting mechanism. A boundary that can re-enter the thing it replaces
 * can recurse.
 */

use crate::location::SourceLocation;
use crate::notice;
use crate::report::FatalReport;
use crate::terminate::{AbortOnUnwind, terminate};

/// Report an unrecoverable error and abort the process.
///
/// Accepts any payload, sized or not. The payload is never read.
///
/// ```rust,no_run
/// fn slot(table: &[u32], i: usize) -> u32 {
///     match table.get(i) {
///         Some(v) => *v,
///         None => fatal_boundary::report_fatal("slot out of range"),
///     }
/// }
/// ```
#[cold]
#[inline(never)]
pub fn report_fatal<E: ?Sized>(error: &E) -> ! {
    terminate_with(&FatalReport::of(error, None))
}

/// Same as [`report_fatal`], with a location for whoever is listening.
///
/// The location changes nothing about the outcome.
#[cold]
#[inline(never)]
pub fn report_fatal_at<E: ?Sized>(error: &E, location: &SourceLocation<'_>) -> ! {
    terminate_with(&FatalReport::of(error, Some(*location)))
}

fn terminate_with(report: &FatalReport<'_>) -> ! {
    let _unwind_guard = AbortOnUnwind;
    notice::dispatch(report);
    terminate()
}

/// A sink for unrecoverable errors.
///
/// Generic code that has to bail out fatally can take `impl FatalSink`
/// instead of naming the free functions. There is one implementation,
/// [`Abort`]; the trait exists so the no-return contract is part of the
/// type signature at the seam, not a convention.
pub trait FatalSink {
    fn report<E: ?Sized>(&self, error: &E) -> !;

    fn report_at<E: ?Sized>(&self, error: &E, location: &SourceLocation<'_>) -> !;
}

/// The boundary as a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Abort;

impl FatalSink for Abort {
    #[inline]
    fn report<E: ?Sized>(&self, error: &E) -> ! {
        report_fatal(error)
    }

    #[inline]
    fn report_at<E: ?Sized>(&self, error: &E, location: &SourceLocation<'_>) -> ! {
        report_fatal_at(error, location)
    }
}

/// Report a fatal error at the call site and abort.
///
/// Captures file, line and column of the invocation, with `module_path!()`
/// standing in for the function name.
///
/// ```rust,no_run
/// # struct PoolExhausted;
/// fatal_boundary::fatal!(PoolExhausted);
/// ```
#[macro_export]
macro_rules! fatal {
    ($error:expr $(,)?) => {
        $crate::report_fatal_at(
            &$error,
            &$crate::SourceLocation::caller().with_function(::core::module_path!()),
        )
    };
}
