//! Parsed Circumflang tree: documents, groups and value lists.
//!
//! The tree is built once by the parser and is read-only afterwards. It is
//! designed to be:
//!
//! - **Owned**: no borrows from the input, so a document outlives its text
//! - **Ordered**: every container iterates in source order
//! - **Shareable**: `Send + Sync`, no interior mutability

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::AccessError;
use crate::parser::Parser;

/// Normalize a tag the way it is stored: trimmed and lowercased.
///
/// Borrows when the tag is already in normal form.
pub fn normalize_tag(tag: &str) -> Cow<'_, str> {
    let trimmed = tag.trim();
    if trimmed.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase()) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(trimmed.to_lowercase())
    }
}

// ============================================================================
// ValueList
// ============================================================================

/// The ordered, trimmed elements of one field, split on `^`.
///
/// A list produced by parsing always holds at least one element: the empty
/// string parses to `[""]`. Equality is element-wise sequence equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValueList {
    values: Vec<String>,
}

impl ValueList {
    /// Parse the raw text of a field.
    ///
    /// ```rust
    /// use circumflang_core::ValueList;
    ///
    /// let values = ValueList::parse(" red ^green^ ");
    /// assert_eq!(values.as_slice(), ["red", "green", ""]);
    /// ```
    pub fn parse(text: &str) -> ValueList {
        Parser::parse_values(text)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True only for lists built by hand from no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element at `index`, or `OutOfRange`.
    pub fn at(&self, index: usize) -> Result<&str, AccessError> {
        self.get(index)
            .ok_or_else(|| AccessError::out_of_range(index, self.len()))
    }

    /// Element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// First element. Always present for parsed lists.
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.values.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }
}

impl From<Vec<String>> for ValueList {
    fn from(values: Vec<String>) -> Self {
        ValueList { values }
    }
}

impl<S: Into<String>> FromIterator<S> for ValueList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ValueList {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ValueList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for ValueList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

// ============================================================================
// Group
// ============================================================================

/// A borrowed tag/value pair from a [`Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<'a> {
    tag: &'a str,
    value: &'a ValueList,
}

impl<'a> Pair<'a> {
    /// The normalized (trimmed, lowercased) tag.
    #[inline]
    pub fn tag(&self) -> &'a str {
        self.tag
    }

    #[inline]
    pub fn value(&self) -> &'a ValueList {
        self.value
    }
}

/// Iterator over the pairs of a [`Group`], in insertion order.
#[derive(Debug, Clone)]
pub struct Pairs<'a> {
    inner: indexmap::map::Iter<'a, String, ValueList>,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = Pair<'a>;

    #[inline]
    fn next(&mut self) -> Option<Pair<'a>> {
        self.inner.next().map(|(tag, value)| Pair { tag, value })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Pairs<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(tag, value)| Pair { tag, value })
    }
}

impl ExactSizeIterator for Pairs<'_> {}

/// One parsed record: uniquely tagged value lists in insertion order.
///
/// Tags are stored trimmed and lowercased, and every lookup normalizes its
/// argument the same way, so `"  NAME "` finds `name`. Malformed pair
/// segments and repeated tags were dropped during parsing; the first
/// occurrence of a tag wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pairs: IndexMap<String, ValueList>,
}

impl Group {
    /// Parse the raw text of one record.
    ///
    /// ```rust
    /// use circumflang_core::Group;
    ///
    /// let group = Group::parse("Name^^Alice^^^Langs^^en^fr");
    /// assert_eq!(group.len(), 2);
    /// assert_eq!(group.value_for("LANGS").unwrap().as_slice(), ["en", "fr"]);
    /// ```
    pub fn parse(text: &str) -> Group {
        Parser::quiet().parse_group(text, 0)
    }

    pub(crate) fn from_pairs(pairs: IndexMap<String, ValueList>) -> Group {
        Group { pairs }
    }

    /// Number of retained pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.pairs.keys().map(String::as_str)
    }

    /// Values in insertion order, aligned with [`Group::tags`].
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &ValueList> + ExactSizeIterator + '_ {
        self.pairs.values()
    }

    /// Value for `tag` (case-insensitive, trimmed), or `KeyNotFound`.
    pub fn value_for(&self, tag: &str) -> Result<&ValueList, AccessError> {
        let key = normalize_tag(tag);
        self.pairs
            .get(key.as_ref())
            .ok_or_else(|| AccessError::key_not_found(key))
    }

    /// Value for `tag` (case-insensitive, trimmed), if present.
    pub fn get(&self, tag: &str) -> Option<&ValueList> {
        self.pairs.get(normalize_tag(tag).as_ref())
    }

    /// Pair at insertion position `index`.
    pub fn pair_at(&self, index: usize) -> Option<Pair<'_>> {
        self.pairs
            .get_index(index)
            .map(|(tag, value)| Pair { tag, value })
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.pairs.contains_key(normalize_tag(tag).as_ref())
    }

    /// True if any stored value list equals `value` element by element.
    pub fn contains_value(&self, value: &ValueList) -> bool {
        self.pairs.values().any(|v| v == value)
    }

    pub fn iter(&self) -> Pairs<'_> {
        Pairs {
            inner: self.pairs.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = Pair<'a>;
    type IntoIter = Pairs<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed Circumflang document: its groups in source order.
///
/// There is one group per `^^^^`-separated record, including records that
/// turned out empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    groups: Vec<Group>,
}

impl Document {
    /// Parse a complete Circumflang text.
    ///
    /// Line breaks are stripped first and never carry meaning. Parsing
    /// cannot fail; use [`Parser::parse_with_recovery`] to learn what was
    /// dropped.
    ///
    /// ```rust
    /// use circumflang_core::Document;
    ///
    /// let doc = Document::parse("id^^1^^^tags^^a^b\n^^^^id^^2");
    /// assert_eq!(doc.len(), 2);
    /// assert_eq!(doc.at(1).unwrap().value_for("id").unwrap().first(), Some("2"));
    /// ```
    pub fn parse(text: &str) -> Document {
        Parser::quiet().parse_document(text)
    }

    pub(crate) fn from_groups(groups: Vec<Group>) -> Document {
        Document { groups }
    }

    /// Number of groups.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True only for documents built by hand; parsing yields at least one group.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group at `index`, or `OutOfRange`.
    pub fn at(&self, index: usize) -> Result<&Group, AccessError> {
        self.groups
            .get(index)
            .ok_or_else(|| AccessError::out_of_range(index, self.len()))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// Total number of retained pairs across all groups.
    pub fn pairs_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl IntoIterator for Document {
    type Item = Group;
    type IntoIter = std::vec::IntoIter<Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
