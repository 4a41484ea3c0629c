/*
 * ffi.rs
 *
 * C ABI entry points, for library cores whose fatal-error customization
 * point is a C (or extern "C" C++) symbol. Header: include/fatal_boundary.h
 *
 * extern "C" here is the non-unwinding ABI: if anything did try to unwind
 * out of these, Rust aborts at the boundary. Nothing does.
 */

use core::ffi::{CStr, c_char, c_void};

use crate::boundary::{report_fatal, report_fatal_at};
use crate::location::SourceLocation;

/// Location descriptor as C callers pass it.
///
/// `file` and `function` are NUL-terminated or null. `line`/`column` 0 mean unknown.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawSourceLocation {
    pub file: *const c_char,
    pub line: u32,
    pub column: u32,
    pub function: *const c_char,
}

/// A foreign error payload. Only the address is kept, and nothing reads through it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct ForeignPayload(pub *const c_void);

/// Report a fatal error from C and abort.
///
/// `error` may be anything, including null. It is not dereferenced.
#[unsafe(no_mangle)]
pub extern "C" fn fatal_boundary_report(error: *const c_void) -> ! {
    report_fatal(&ForeignPayload(error))
}

/// Report a fatal error with a location from C and abort.
///
/// A null `location` behaves like [`fatal_boundary_report`].
///
/// # Safety
///
/// `location` must be null or point to a readable `RawSourceLocation`
/// whose `file` and `function` are each null or a NUL-terminated string.
/// All of it only has to stay valid until abort, which is immediate.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fatal_boundary_report_at(
    error: *const c_void,
    location: *const RawSourceLocation,
) -> ! {
    let payload = ForeignPayload(error);
    // SAFETY: caller guarantees location is null or valid for reads.
    match unsafe { location.as_ref() } {
        // SAFETY: caller guarantees the descriptor's strings are null or NUL-terminated.
        Some(raw) => report_fatal_at(&payload, &unsafe { decode(raw) }),
        None => report_fatal(&payload),
    }
}

/// Borrow a C descriptor as a `SourceLocation`.
///
/// Null or non-UTF-8 strings come back empty rather than failing: the
/// location is advisory and there's no error path out of the boundary.
///
/// # Safety
///
/// `raw.file` and `raw.function` must each be null or NUL-terminated and
/// live at least as long as the returned value.
pub unsafe fn decode(raw: &RawSourceLocation) -> SourceLocation<'_> {
    // SAFETY: forwarded from the caller's contract.
    let file = unsafe { c_str(raw.file) };
    // SAFETY: forwarded from the caller's contract.
    let function = unsafe { c_str(raw.function) };
    SourceLocation::new(file, raw.line, raw.column, function)
}

/* null -> "", invalid utf-8 -> "" */
unsafe fn c_str<'a>(ptr: *const c_char) -> &'a str {
    if ptr.is_null() {
        return "";
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
}
