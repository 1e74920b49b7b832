//! Source positions carried through validation for diagnostics.

use std::fmt;

/// A half-open byte range in a source document.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A span within a named document.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    pub document: String,
    pub span: Span,
}

impl Location {
    pub fn new(document: impl Into<String>, span: Span) -> Self {
        Location {
            document: document.into(),
            span,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.document, self.span)
    }
}
