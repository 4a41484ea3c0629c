/*
 * error.rs
 *
 * The boundary itself cannot fail. The one thing around it that can is
 * installing the notice hook, and only in one way.
 */

use core::fmt;

/* everything that can go wrong */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryError {
    /// set_notice_hook was already called in this process
    HookAlreadyInstalled,
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HookAlreadyInstalled => write!(f, "fatal notice hook already installed"),
        }
    }
}

impl core::error::Error for BoundaryError {}

pub type Result<T> = core::result::Result<T, BoundaryError>;
