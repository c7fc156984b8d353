//! Source location tracking for parsed segments.
//!
//! Spans are byte offsets into the *normalized* input, that is the text
//! left after every `\n` and `\r` has been stripped. Line breaks carry no
//! meaning in Circumflang, so offsets into the raw input would only be
//! misleading.

/// A byte range in the normalized source text.
///
/// Both `start` and `end` are inclusive-exclusive: `[start, end)`.
///
/// # Example
///
/// ```rust
/// use circumflang_core::span::Span;
///
/// let span = Span::new(4, 10);
/// assert_eq!(span.len(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Shift the span right by `offset` bytes.
    ///
    /// Used to turn a span local to a record into one relative to the
    /// whole document.
    #[inline]
    pub const fn shifted(self, offset: u32) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Slice `source` with this span, if it lies on character boundaries.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start as usize..self.end as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_moves_both_ends() {
        let span = Span::new(2, 5).shifted(10);
        assert_eq!(span, Span::new(12, 15));
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn empty_span() {
        assert!(Span::new(7, 7).is_empty());
        assert!(!Span::new(7, 8).is_empty());
    }

    #[test]
    fn slice_out_of_bounds_is_none() {
        assert_eq!(Span::new(0, 3).slice("abcdef"), Some("abc"));
        assert_eq!(Span::new(4, 9).slice("abcdef"), None);
    }
}
