//! Marker scanning with SIMD-accelerated search.
//!
//! Circumflang nests four separators built from the same character:
//! records are split on `^^^^`, pairs on `^^^`, tag from value on `^^` and
//! value elements on a single `^`. Each level is a left-to-right,
//! non-overlapping split that keeps empty segments, so every split yields
//! at least one segment.
//!
//! # Performance
//!
//! - Zero-copy: segments borrow directly from the input
//! - Marker search via `memchr::memmem` (SIMD on supported platforms)
//! - Line-break stripping only allocates when a `\n` or `\r` is present

use std::borrow::Cow;

use memchr::{memchr2, memmem};

use crate::span::Span;

/// Separates records (groups) in a document.
pub const RECORD_MARKER: &str = "^^^^";
/// Separates tag/value pairs in a record.
pub const PAIR_MARKER: &str = "^^^";
/// Separates a tag from its value.
pub const TAG_VALUE_MARKER: &str = "^^";
/// Separates the elements of a multi-valued field.
pub const VALUE_SEPARATOR: &str = "^";

/// Remove every `\n` and `\r` from `input`.
///
/// Borrows the input when there is nothing to strip.
pub fn strip_line_breaks(input: &str) -> Cow<'_, str> {
    let Some(first) = memchr2(b'\n', b'\r', input.as_bytes()) else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..first]);
    let mut rest = &input[first + 1..];
    while let Some(pos) = memchr2(b'\n', b'\r', rest.as_bytes()) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// One piece of input between two markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The segment text, untrimmed.
    pub text: &'a str,
    /// Byte span in the normalized input.
    pub span: Span,
}

/// Iterator over the segments of `input` separated by a marker.
///
/// Behaves like `str::split` with a string pattern, but tracks spans
/// relative to an enclosing text.
pub struct Segments<'a> {
    input: &'a str,
    finder: memmem::Finder<'static>,
    marker_len: usize,
    /// Offset of `input` inside the normalized document.
    base: u32,
    /// Current byte offset into `input`.
    offset: usize,
    finished: bool,
}

impl<'a> Segments<'a> {
    /// Split `input` on `marker`, with spans starting at zero.
    #[inline]
    pub fn new(input: &'a str, marker: &'static str) -> Self {
        Self::with_base(input, marker, 0)
    }

    /// Split `input` on `marker`, with spans shifted by `base`.
    pub fn with_base(input: &'a str, marker: &'static str, base: u32) -> Self {
        debug_assert!(!marker.is_empty(), "marker must not be empty");
        Self {
            input,
            finder: memmem::Finder::new(marker.as_bytes()),
            marker_len: marker.len(),
            base,
            offset: 0,
            finished: false,
        }
    }

    #[inline(always)]
    fn segment(&self, start: usize, end: usize) -> Segment<'a> {
        Segment {
            text: &self.input[start..end],
            span: Span::new(start as u32, end as u32).shifted(self.base),
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if self.finished {
            return None;
        }

        let start = self.offset;
        match self.finder.find(&self.input.as_bytes()[start..]) {
            Some(pos) => {
                let end = start + pos;
                self.offset = end + self.marker_len;
                Some(self.segment(start, end))
            }
            None => {
                self.finished = true;
                Some(self.segment(start, self.input.len()))
            }
        }
    }
}

impl std::iter::FusedIterator for Segments<'_> {}

/// Split a pair segment into its tag and raw value text.
///
/// Returns `None` when the tag-value marker is absent. Anything after a
/// second `^^` is ignored.
pub fn split_pair(text: &str) -> Option<(&str, &str)> {
    let mut parts = Segments::new(text, TAG_VALUE_MARKER);
    let tag = parts.next()?;
    let value = parts.next()?;
    Some((tag.text, value.text))
}

/// Count non-overlapping occurrences of `marker` in `input`.
pub fn count_markers(input: &str, marker: &str) -> usize {
    let finder = memmem::Finder::new(marker.as_bytes());
    let bytes = input.as_bytes();
    let mut count = 0;
    let mut offset = 0;
    while let Some(pos) = finder.find(&bytes[offset..]) {
        count += 1;
        offset += pos + marker.len();
    }
    count
}
