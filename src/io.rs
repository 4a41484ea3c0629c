/*
 * io.rs
 *
 * no_std stderr output via libc::write.
 *
 * no buffering, no locks, no allocation. this runs on the way to abort(),
 * possibly because the allocator is what broke, so std's Stderr (reentrant
 * mutex, line buffer) is off the table. callers format into a NoticeBuf
 * first and hand over whole lines.
 */

const STDERR: i32 = 2;

/// Write all of `buf` to stderr, best-effort.
///
/// Loops on short writes. Gives up silently on error: there is nobody left
/// to report a failed diagnostic to.
pub fn write_stderr(mut buf: &[u8]) {
    while !buf.is_empty() {
        // SAFETY: buf is a valid, initialized byte slice for its length.
        // write(2) on an invalid/closed fd returns -1, it doesn't fault.
        let n = unsafe { libc::write(STDERR, buf.as_ptr().cast(), buf.len()) };
        if n <= 0 {
            return;
        }
        #[allow(clippy::cast_sign_loss)]
        let written = (n as usize).min(buf.len());
        buf = &buf[written..];
    }
}
