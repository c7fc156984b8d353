//! Bottom-up parser for Circumflang text.
//!
//! Builds the owned tree in one pass per level: records, then pairs, then
//! value elements. Malformed pair segments and repeated tags are dropped;
//! in recovery mode each drop is also recorded as a [`Diagnostic`].

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::ast::{normalize_tag, Document, Group, ValueList};
use crate::error::{Diagnostic, Diagnostics};
use crate::lexer::{
    split_pair, strip_line_breaks, Segments, PAIR_MARKER, RECORD_MARKER, VALUE_SEPARATOR,
};

/// Result type for parsing that includes the dropped segments.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed document, identical to what [`Document::parse`] returns.
    pub document: Document,
    /// Segments dropped while parsing, in source order.
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    /// Check if nothing was dropped.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Circumflang parser with an optional diagnostics channel.
///
/// [`Document::parse`] is the permissive entry point and stays silent about
/// dropped segments. A `Parser` produces the same tree but can also report
/// what it dropped.
#[derive(Debug)]
pub struct Parser {
    /// Diagnostics collected during the current parse.
    diagnostics: Diagnostics,
    /// Whether drops are recorded as diagnostics.
    record: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser that records diagnostics.
    #[inline]
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            record: true,
        }
    }

    /// Parser used by the silent constructors.
    #[inline]
    pub(crate) fn quiet() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            record: false,
        }
    }

    /// Parse with recovery, returning the document and every drop.
    ///
    /// The parser is reset first, so one instance can parse many inputs.
    pub fn parse_with_recovery(&mut self, input: &str) -> ParseResult {
        self.diagnostics = Diagnostics::new();
        let document = self.parse_document(input);
        ParseResult {
            document,
            diagnostics: std::mem::take(&mut self.diagnostics),
        }
    }

    /// Parse the input, failing with the first dropped segment.
    pub fn parse(&mut self, input: &str) -> Result<Document, Diagnostic> {
        let ParseResult {
            document,
            diagnostics,
        } = self.parse_with_recovery(input);
        match diagnostics.into_iter().next() {
            None => Ok(document),
            Some(first) => Err(first),
        }
    }

    pub(crate) fn parse_document(&mut self, input: &str) -> Document {
        let text = strip_line_breaks(input);
        let before = self.diagnostics.len();

        let groups: Vec<Group> = Segments::new(&text, RECORD_MARKER)
            .map(|record| self.parse_group(record.text, record.span.start))
            .collect();

        debug!(
            groups = groups.len(),
            bytes = text.len(),
            dropped = self.diagnostics.len() - before,
            "parsed circumflang document"
        );
        Document::from_groups(groups)
    }

    /// Parse one record whose text starts at byte `base` of the document.
    pub(crate) fn parse_group(&mut self, text: &str, base: u32) -> Group {
        let mut pairs: IndexMap<String, ValueList> = IndexMap::new();

        for segment in Segments::with_base(text, PAIR_MARKER, base) {
            let Some((raw_tag, raw_value)) = split_pair(segment.text) else {
                trace!(
                    start = segment.span.start,
                    end = segment.span.end,
                    "dropping pair without tag-value marker"
                );
                self.record(|| Diagnostic::malformed_pair(segment.span));
                continue;
            };

            match pairs.entry(normalize_tag(raw_tag).into_owned()) {
                Entry::Occupied(entry) => {
                    trace!(
                        tag = %entry.key(),
                        start = segment.span.start,
                        "dropping duplicate tag"
                    );
                    self.record(|| Diagnostic::duplicate_tag(entry.key(), segment.span));
                }
                Entry::Vacant(entry) => {
                    entry.insert(Self::parse_values(raw_value.trim()));
                }
            }
        }

        Group::from_pairs(pairs)
    }

    pub(crate) fn parse_values(text: &str) -> ValueList {
        Segments::new(text, VALUE_SEPARATOR)
            .map(|element| element.text.trim())
            .collect()
    }

    #[inline]
    fn record(&mut self, diagnostic: impl FnOnce() -> Diagnostic) {
        if self.record {
            self.diagnostics.push(diagnostic());
        }
    }
}
