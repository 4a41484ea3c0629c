/*
 * location.rs
 *
 * Where a fatal error was raised. Advisory only: the boundary behaves the
 * same with or without one. Zero column and empty function mean "unknown",
 * which keeps the type Copy and the C descriptor trivially mappable.
 */

use core::fmt;
use core::panic::Location;

/// Origin of a fatal report: file (or unit), line, column, function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation<'a> {
    pub file: &'a str,
    pub line: u32,
    /// 0 when unknown
    pub column: u32,
    /// empty when unknown. `fatal!` fills in the module path.
    pub function: &'a str,
}

impl<'a> SourceLocation<'a> {
    #[must_use]
    pub const fn new(file: &'a str, line: u32, column: u32, function: &'a str) -> Self {
        Self {
            file,
            line,
            column,
            function,
        }
    }

    /// Location of whoever called this (or the outermost `#[track_caller]` fn).
    #[track_caller]
    #[must_use]
    pub fn caller() -> SourceLocation<'static> {
        SourceLocation::from(Location::caller())
    }

    #[must_use]
    pub const fn with_function(self, function: &'a str) -> Self {
        Self { function, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn has_column(&self) -> bool {
        self.column != 0
    }

    #[inline]
    #[must_use]
    pub const fn has_function(&self) -> bool {
        !self.function.is_empty()
    }
}

impl<'a> From<&'a Location<'a>> for SourceLocation<'a> {
    fn from(loc: &'a Location<'a>) -> Self {
        Self::new(loc.file(), loc.line(), loc.column(), "")
    }
}

/* file:line[:column][ in function] */
impl fmt::Display for SourceLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if self.has_column() {
            write!(f, ":{}", self.column)?;
        }
        if self.has_function() {
            write!(f, " in {}", self.function)?;
        }
        Ok(())
    }
}
