/*
 * termination.rs
 *
 * The boundary kills whoever calls it, so every real call happens in a
 * child process: this test binary re-executes itself with one `child_*`
 * test selected and FATAL_BOUNDARY_CHILD naming it. In the normal run each
 * `child_*` test sees the variable unset and returns immediately.
 *
 * What the parent checks, every time:
 *   - the child got as far as the boundary (ENTERING on stdout)
 *   - nothing after the call ran (no CONTINUED on stdout)
 *   - it died of SIGABRT (unix), and didn't hang (assert_cmd timeout)
 */

use std::error::Error;
use std::io;
use std::ptr;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use assert_cmd::Command;
use assert_cmd::assert::Assert;
use predicates::prelude::*;
use proptest::prelude::*;

use fatal_boundary::ffi::{RawSourceLocation, fatal_boundary_report, fatal_boundary_report_at};
use fatal_boundary::{
    Abort, FatalReport, FatalSink, SourceLocation, fatal, install_panic_hook, notice,
    report_fatal, report_fatal_at, set_notice_hook,
};

const CHILD_ENV: &str = "FATAL_BOUNDARY_CHILD";
const PAYLOAD_KIND_ENV: &str = "FATAL_BOUNDARY_PAYLOAD_KIND";
const PAYLOAD_TEXT_ENV: &str = "FATAL_BOUNDARY_PAYLOAD_TEXT";

const ENTERING: &str = "ENTERING-BOUNDARY";
const CONTINUED: &str = "CONTINUED-PAST-BOUNDARY";

/* =========================================================================
 * HARNESS
 * ========================================================================= */

fn is_child(name: &str) -> bool {
    std::env::var(CHILD_ENV).is_ok_and(|v| v == name)
}

fn child_cmd(name: &str) -> Command {
    let exe = std::env::current_exe().expect("test binary path");
    let mut cmd = Command::new(exe);
    cmd.args([name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, name)
        .timeout(Duration::from_secs(30));
    cmd
}

/* run `scenario` and report if control ever comes back */
fn run_scenario(scenario: fn()) {
    println!("{ENTERING}");
    scenario();
    println!("{CONTINUED}");
}

/* the checks every termination test shares */
fn assert_aborted(assert: Assert) -> Assert {
    let assert = assert
        .failure()
        .stdout(predicate::str::contains(ENTERING))
        .stdout(predicate::str::contains(CONTINUED).not());

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        let status = assert.get_output().status;
        assert_eq!(
            status.signal(),
            Some(libc::SIGABRT),
            "expected SIGABRT, got {status:?}"
        );
    }

    assert
}

fn run_child(name: &str) -> Assert {
    assert_aborted(child_cmd(name).assert())
}

/* payloads of every shape the boundary has to take */
#[derive(Debug)]
struct LedgerCorrupt {
    #[allow(dead_code)]
    shard: u32,
}

fn doc_location() -> SourceLocation<'static> {
    SourceLocation::new("moduleX", 42, 0, "doWork")
}

/* =========================================================================
 * SCENARIOS FROM THE CONTRACT
 * ========================================================================= */

#[test]
fn child_resource_exhausted() {
    if !is_child("child_resource_exhausted") {
        return;
    }
    run_scenario(|| report_fatal("resource exhausted"));
}

#[test]
fn generic_payload_without_location_aborts() {
    /* scenario 1: no hook installed, so the boundary says nothing itself */
    run_child("child_resource_exhausted")
        .stderr(predicate::str::contains("fatal: unrecoverable").not());
}

#[test]
fn child_domain_payload_with_location() {
    if !is_child("child_domain_payload_with_location") {
        return;
    }
    run_scenario(|| report_fatal_at(&LedgerCorrupt { shard: 3 }, &doc_location()));
}

#[test]
fn domain_payload_with_location_aborts_identically() {
    /* scenario 2: location changes nothing about the outcome */
    run_child("child_domain_payload_with_location");
}

fn racing_worker(barrier: &Barrier, id: usize) {
    let payload = format!("worker {id} gave up");
    barrier.wait();
    report_fatal(payload.as_str())
}

fn race(threads: usize) {
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|id| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || racing_worker(&barrier, id))
        })
        .collect();

    /* a join only returns if some worker came back from the boundary */
    for handle in handles {
        let _ = handle.join();
    }
}

#[test]
fn child_two_concurrent_callers() {
    if !is_child("child_two_concurrent_callers") {
        return;
    }
    run_scenario(|| race(2));
}

#[test]
fn two_concurrent_callers_abort_once_without_hang() {
    /* scenario 3 */
    run_child("child_two_concurrent_callers");
}

#[test]
fn child_many_concurrent_callers() {
    if !is_child("child_many_concurrent_callers") {
        return;
    }
    set_notice_hook(notice::stderr).expect("fresh child process");
    run_scenario(|| race(16));
}

#[test]
fn many_concurrent_callers_abort_with_at_most_one_notice() {
    let assert = run_child("child_many_concurrent_callers");
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    let notices = stderr.matches("fatal: unrecoverable").count();
    /* the first one in runs the hook; latecomers abort without it */
    assert!(notices <= 1, "expected at most one notice, got:\n{stderr}");
}

/* =========================================================================
 * NEVER RETURNS INTO UNWINDING
 * ========================================================================= */

fn caught(scenario: fn()) {
    let _ = std::panic::catch_unwind(scenario);
}

#[test]
fn child_inside_catch_unwind() {
    if !is_child("child_inside_catch_unwind") {
        return;
    }
    run_scenario(|| caught(|| report_fatal(&io::Error::other("disk gone"))));
}

#[test]
fn catch_unwind_never_sees_the_boundary() {
    run_child("child_inside_catch_unwind");
}

fn panicking_hook(_: &FatalReport<'_>) {
    panic!("notice hook blew up");
}

#[test]
fn child_panicking_hook() {
    if !is_child("child_panicking_hook") {
        return;
    }
    set_notice_hook(panicking_hook).expect("fresh child process");
    run_scenario(|| caught(|| report_fatal(&7u8)));
}

#[test]
fn panicking_hook_still_aborts() {
    /* test profile unwinds: the guard has to turn the unwind into abort */
    run_child("child_panicking_hook").stderr(predicate::str::contains("notice hook blew up"));
}

fn reentrant_hook(report: &FatalReport<'_>) {
    notice::stderr(report);
    /* a hook that reports fatally itself must not recurse */
    report_fatal("from inside the hook")
}

#[test]
fn child_reentrant_hook() {
    if !is_child("child_reentrant_hook") {
        return;
    }
    set_notice_hook(reentrant_hook).expect("fresh child process");
    run_scenario(|| report_fatal("outer"));
}

#[test]
fn reentrant_hook_aborts_without_recursion() {
    let assert = run_child("child_reentrant_hook");
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(stderr.matches("fatal: unrecoverable").count(), 1, "{stderr}");
}

#[test]
fn child_panic_hook_routes_panics() {
    if !is_child("child_panic_hook_routes_panics") {
        return;
    }
    set_notice_hook(notice::stderr).expect("fresh child process");
    install_panic_hook();
    run_scenario(|| caught(|| panic!("invariant violated")));
}

#[test]
fn panic_hook_turns_panic_into_abort() {
    run_child("child_panic_hook_routes_panics")
        /* the chained default hook still prints the message */
        .stderr(predicate::str::contains("invariant violated"))
        .stderr(predicate::str::contains("fatal: unrecoverable"))
        .stderr(predicate::str::contains("termination.rs"));
}

/* =========================================================================
 * NOTICE HOOK OUTPUT
 * ========================================================================= */

#[test]
fn child_stderr_notice_with_location() {
    if !is_child("child_stderr_notice_with_location") {
        return;
    }
    set_notice_hook(notice::stderr).expect("fresh child process");
    run_scenario(|| Abort.report_at(&LedgerCorrupt { shard: 9 }, &doc_location()));
}

#[test]
fn stderr_notice_names_type_and_location() {
    run_child("child_stderr_notice_with_location")
        .stderr(predicate::str::contains("fatal: unrecoverable"))
        .stderr(predicate::str::contains("LedgerCorrupt"))
        .stderr(predicate::str::contains("at moduleX:42 in doWork"));
}

#[test]
fn child_fatal_macro() {
    if !is_child("child_fatal_macro") {
        return;
    }
    set_notice_hook(notice::stderr).expect("fresh child process");
    run_scenario(|| fatal!(LedgerCorrupt { shard: 1 }));
}

#[test]
fn fatal_macro_captures_call_site() {
    run_child("child_fatal_macro")
        .stderr(predicate::str::contains("termination.rs:"))
        .stderr(predicate::str::contains(" in termination"));
}

/* =========================================================================
 * C ENTRY POINTS
 * ========================================================================= */

#[test]
fn child_ffi_report() {
    if !is_child("child_ffi_report") {
        return;
    }
    run_scenario(|| fatal_boundary_report(ptr::null()));
}

#[test]
fn ffi_report_aborts_on_null_payload() {
    run_child("child_ffi_report");
}

#[test]
fn child_ffi_report_at() {
    if !is_child("child_ffi_report_at") {
        return;
    }
    set_notice_hook(notice::stderr).expect("fresh child process");
    run_scenario(|| {
        let raw = RawSourceLocation {
            file: c"moduleX".as_ptr(),
            line: 42,
            column: 3,
            function: c"doWork".as_ptr(),
        };
        let payload = 0xdead_u32;
        // SAFETY: raw is a valid descriptor with static C strings.
        unsafe { fatal_boundary_report_at((&raw const payload).cast(), &raw const raw) }
    });
}

#[test]
fn ffi_report_at_carries_location() {
    run_child("child_ffi_report_at")
        .stderr(predicate::str::contains("ForeignPayload"))
        .stderr(predicate::str::contains("at moduleX:42:3 in doWork"));
}

#[test]
fn child_ffi_report_at_null_location() {
    if !is_child("child_ffi_report_at_null_location") {
        return;
    }
    set_notice_hook(notice::stderr).expect("fresh child process");
    // SAFETY: null location is explicitly allowed.
    run_scenario(|| unsafe { fatal_boundary_report_at(ptr::null(), ptr::null()) });
}

#[test]
fn ffi_report_at_null_location_falls_back() {
    run_child("child_ffi_report_at_null_location")
        .stderr(predicate::str::contains("(no location)"));
}

/* =========================================================================
 * ANY PAYLOAD
 * ========================================================================= */

/* one payload per shape: sized, unsized, trait objects, zero-sized */
fn report_payload(kind: usize, text: &str) -> ! {
    match kind {
        0 => report_fatal(text),
        1 => report_fatal(&text.len()),
        2 => report_fatal(text.as_bytes()),
        3 => report_fatal(&io::Error::other(text.to_owned())),
        4 => {
            let boxed: Box<dyn Error + Send + Sync> = text.into();
            report_fatal(&*boxed)
        }
        5 => report_fatal(&()),
        6 => report_fatal_at(&text.to_owned(), &SourceLocation::new(text, 0, 0, text)),
        _ => {
            let any: &dyn std::any::Any = &kind;
            report_fatal(any)
        }
    }
}

#[test]
fn child_arbitrary_payload() {
    if !is_child("child_arbitrary_payload") {
        return;
    }
    run_scenario(|| {
        let kind = std::env::var(PAYLOAD_KIND_ENV)
            .ok()
            .and_then(|k| k.parse().ok())
            .unwrap_or(0);
        let text = std::env::var(PAYLOAD_TEXT_ENV).unwrap_or_default();
        report_payload(kind, &text)
    });
}

/* each case is a process spawn, keep the count low */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_payload_aborts(kind in 0usize..8, text in "[a-zA-Z0-9 _:./-]{0,48}") {
        let assert = child_cmd("child_arbitrary_payload")
            .env(PAYLOAD_KIND_ENV, kind.to_string())
            .env(PAYLOAD_TEXT_ENV, &text)
            .assert();
        assert_aborted(assert);
    }
}
