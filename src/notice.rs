/*
 * notice.rs
 *
 * Optional last words before abort. Off unless the host installs a hook.
 *
 * Rules, because this runs on a dying process:
 *   - only the first call into the boundary gets to run the hook. anyone
 *     else (another thread, or the hook itself calling report_fatal) goes
 *     straight to abort. no waiting, no recursion.
 *   - the stock stderr hook formats into a stack buffer and does one
 *     write(2). no allocation, no std::io.
 */

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::{BoundaryError, Result};
use crate::io::write_stderr;
use crate::report::FatalReport;
use crate::sync::OnceSlot;

/// Called once, by the first fatal report, right before abort.
pub type NoticeHook = fn(&FatalReport<'_>);

static HOOK: OnceSlot<NoticeHook> = OnceSlot::new();

/* Running (false) -> Terminated (true). never reset. */
static ENTERED: AtomicBool = AtomicBool::new(false);

/// Install the process-wide notice hook. Once per process.
///
/// ```rust
/// let _ = fatal_boundary::set_notice_hook(fatal_boundary::notice::stderr);
/// assert!(fatal_boundary::notice_hook().is_some());
/// ```
pub fn set_notice_hook(hook: NoticeHook) -> Result<()> {
    HOOK.set(hook).map_err(|_| BoundaryError::HookAlreadyInstalled)
}

/// The installed hook, if any.
#[inline]
pub fn notice_hook() -> Option<NoticeHook> {
    HOOK.get()
}

/// Flip Running -> Terminated and run the hook if we were first.
///
/// Only the boundary calls this, and only right before terminate().
pub(crate) fn dispatch(report: &FatalReport<'_>) {
    if ENTERED.swap(true, Ordering::AcqRel) {
        return;
    }
    if let Some(hook) = HOOK.get() {
        hook(report);
    }
}

/* -------------------------------------------------------------------------- */
/*                           stock stderr notice                              */
/* -------------------------------------------------------------------------- */

/// Capacity of a rendered notice, newline included.
pub const NOTICE_CAPACITY: usize = 512;

/// Fixed stack buffer for one notice line.
///
/// Writes past capacity are truncated at a char boundary, never an error,
/// so a long file path can't cut the notice short of its newline. One byte
/// is always held back for the trailing `\n`. Once the line is finished
/// (anything `render` returns) further writes are dropped and only mark it
/// truncated.
pub struct NoticeBuf {
    bytes: [u8; NOTICE_CAPACITY],
    len: usize,
    truncated: bool,
    finished: bool,
}

impl NoticeBuf {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; NOTICE_CAPACITY],
            len: 0,
            truncated: false,
            finished: false,
        }
    }

    /// Rendered bytes so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Rendered text so far. Always valid UTF-8: we only ever cut on char boundaries.
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /* append the newline into the reserved byte. idempotent. */
    fn finish_line(&mut self) {
        if self.finished {
            return;
        }
        self.bytes[self.len] = b'\n';
        self.len += 1;
        self.finished = true;
    }
}

impl Default for NoticeBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for NoticeBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        /* nothing goes after the newline */
        if self.finished {
            self.truncated |= !s.is_empty();
            return Ok(());
        }
        let room = (NOTICE_CAPACITY - 1).saturating_sub(self.len);
        let mut take = s.len().min(room);
        if take < s.len() {
            self.truncated = true;
            while !s.is_char_boundary(take) {
                take -= 1;
            }
        }
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Render `report` as one newline-terminated line into a fresh buffer.
///
/// `fatal: unrecoverable <type> at <location>` or
/// `fatal: unrecoverable <type> (no location)`.
#[must_use]
pub fn render(report: &FatalReport<'_>) -> NoticeBuf {
    let mut buf = NoticeBuf::new();
    /* NoticeBuf::write_str never fails, and Display impls here don't either */
    let _ = match &report.location {
        Some(loc) => write!(buf, "fatal: unrecoverable {} at {}", report.payload_type, loc),
        None => write!(buf, "fatal: unrecoverable {} (no location)", report.payload_type),
    };
    buf.finish_line();
    buf
}

/// Stock hook: one line on stderr, single write.
///
/// ```rust
/// let _ = fatal_boundary::set_notice_hook(fatal_boundary::notice::stderr);
/// ```
pub fn stderr(report: &FatalReport<'_>) {
    let buf = render(report);
    write_stderr(buf.as_bytes());
}
