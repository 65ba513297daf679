//! Source location tracking for runes, tokens and diagnostics.

use std::fmt;

/// A position in the input.
///
/// Both coordinates are 0-indexed internally. The `Display` form is
/// 1-indexed (`line:column`), which is what every user-facing message shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    /// 0-indexed line.
    pub line: usize,
    /// 0-indexed column, counted in runes.
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns the location of the rune that follows `c`.
    #[must_use]
    pub const fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                line: self.line + 1,
                column: 0,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}
