/*
 * report.rs
 *
 * What the notice hook gets to see of a fatal call. Borrowed, lives for one
 * call, never stored. The payload itself is not in here on purpose: only its
 * static type name, which costs nothing and can't fail.
 */

use core::any::type_name;

use crate::location::SourceLocation;

/// Transient view of one fatal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatalReport<'a> {
    /// `core::any::type_name` of the payload. Best-effort, not stable across compilers.
    pub payload_type: &'static str,
    pub location: Option<SourceLocation<'a>>,
}

impl<'a> FatalReport<'a> {
    /// Describe a payload of type `E` without touching the value.
    #[inline]
    #[must_use]
    pub fn of<E: ?Sized>(_error: &E, location: Option<SourceLocation<'a>>) -> Self {
        Self {
            payload_type: type_name::<E>(),
            location,
        }
    }
}
