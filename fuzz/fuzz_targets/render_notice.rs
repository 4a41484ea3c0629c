/*
 * fuzz_targets/render_notice.rs
 *
 * fuzz target for the stderr notice renderer. it runs on a dying process
 * with a fixed stack buffer, so it must never panic, never overflow, and
 * never split a UTF-8 sequence whatever the location strings look like.
 *
 * input layout: [line:4][column:4][split:1][file ++ function bytes]
 */

#![no_main]

use fatal_boundary::notice::{NOTICE_CAPACITY, render};
use fatal_boundary::{FatalReport, SourceLocation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    let line = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let column = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let rest = &data[9..];
    let split = usize::from(data[8]).min(rest.len());

    let (Ok(file), Ok(function)) = (
        core::str::from_utf8(&rest[..split]),
        core::str::from_utf8(&rest[split..]),
    ) else {
        return;
    };

    let loc = SourceLocation::new(file, line, column, function);
    let buf = render(&FatalReport::of(rest, Some(loc)));

    assert!(buf.as_bytes().len() <= NOTICE_CAPACITY);
    assert!(core::str::from_utf8(buf.as_bytes()).is_ok());
    assert_eq!(buf.as_bytes().last(), Some(&b'\n'));
});
