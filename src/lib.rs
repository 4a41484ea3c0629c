/*
 * lib.rs
 *
 * The whole crate is one terminal operation. Everything else here exists to
 * get a caller into it (Rust fn, C symbol, panic path) or to say something
 * on stderr on the way out.
 */

//! # fatal-boundary
//!
//! A fail-fast sink for unrecoverable errors. Libraries that would normally
//! unwind (C++ `throw`, Rust `panic!`) call into the boundary instead, and the
//! process aborts. Nothing returns, nothing unwinds, nothing is retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fatal_boundary::{SourceLocation, fatal, report_fatal, report_fatal_at};
//!
//! fn reserve(len: usize) -> Vec<u8> {
//!     let mut buf = Vec::new();
//!     if buf.try_reserve_exact(len).is_err() {
//!         report_fatal("resource exhausted");
//!     }
//!     buf
//! }
//!
//! # let err = std::io::Error::other("disk gone");
//! let here = SourceLocation::new("moduleX", 42, 0, "doWork");
//! report_fatal_at(&err, &here);
//! // unreachable: report_fatal_at returns `!`
//! ```
//!
//! `fatal!` captures the call site for you:
//!
//! ```rust,no_run
//! # let err = "bad state";
//! fatal_boundary::fatal!(err);
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod boundary;
pub mod error;
pub mod ffi;
pub mod io;
pub mod location;
pub mod notice;
pub mod panic;
pub mod report;
pub mod sync;
pub mod terminate;

pub use boundary::{Abort, FatalSink, report_fatal, report_fatal_at};
pub use error::{BoundaryError, Result};
pub use location::SourceLocation;
pub use notice::{NoticeHook, notice_hook, set_notice_hook};
#[cfg(feature = "std")]
pub use panic::install_panic_hook;
pub use report::FatalReport;
