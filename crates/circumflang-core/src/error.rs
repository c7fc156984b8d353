use crate::span::Span;
use std::fmt;

/// Error returned by the indexed and keyed accessors of the parsed tree.
///
/// Parsing itself never fails; only asking for something that is not
/// there does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Positional access outside `[0, len)`.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Number of elements in the container.
        len: usize,
    },
    /// Keyed access with a tag the group does not contain.
    KeyNotFound {
        /// The normalized tag that was looked up.
        tag: String,
    },
}

impl AccessError {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        AccessError::OutOfRange { index, len }
    }

    pub(crate) fn key_not_found(tag: impl Into<String>) -> Self {
        AccessError::KeyNotFound { tag: tag.into() }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::OutOfRange { index, len } => {
                write!(f, "index {} out of range for length {}", index, len)
            }
            AccessError::KeyNotFound { tag } => write!(f, "tag not found: {:?}", tag),
        }
    }
}

impl std::error::Error for AccessError {}

/// Why a segment was dropped while building a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A pair segment without the `^^` tag-value marker.
    MalformedPair,
    /// A pair whose normalized tag was already present in the group.
    DuplicateTag,
}

impl DiagnosticKind {
    /// Short lowercase name, stable for machine-readable output.
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedPair => "malformed-pair",
            DiagnosticKind::DuplicateTag => "duplicate-tag",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A segment the parser dropped, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// Location of the dropped pair segment in the normalized input
    pub span: Span,
    /// Diagnostic categorization
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a diagnostic for a pair segment missing its tag-value marker.
    pub fn malformed_pair(span: Span) -> Self {
        Self {
            message: "pair segment has no tag-value marker".to_string(),
            span,
            kind: DiagnosticKind::MalformedPair,
        }
    }

    /// Create a diagnostic for a repeated tag.
    pub fn duplicate_tag(tag: &str, span: Span) -> Self {
        Self {
            message: format!("duplicate tag {:?} ignored", tag),
            span,
            kind: DiagnosticKind::DuplicateTag,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at bytes {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Diagnostics collected while parsing, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a diagnostic to the collection.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if anything was collected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Get the first diagnostic, if any.
    pub fn first(&self) -> Option<&Diagnostic> {
        self.items.first()
    }

    /// Count diagnostics of one kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
