//! Integration tests for the Circumflang parser

use circumflang_core::lexer::{count_markers, strip_line_breaks, PAIR_MARKER, RECORD_MARKER};
use circumflang_core::span::Span;
use circumflang_core::{
    AccessError, DiagnosticKind, Document, Group, Pair, Parser, ValueList,
};

// ============================================================================
// ValueList Tests
// ============================================================================

#[test]
fn test_value_list_splits_and_trims() {
    let values = ValueList::parse("  one ^ two^three  ");
    assert_eq!(values.len(), 3);
    assert_eq!(values.at(0), Ok("one"));
    assert_eq!(values.at(1), Ok("two"));
    assert_eq!(values.at(2), Ok("three"));
}

#[test]
fn test_value_list_empty_input() {
    let values = ValueList::parse("");
    assert_eq!(values.len(), 1);
    assert_eq!(values.at(0), Ok(""));
    assert!(!values.is_empty());
}

#[test]
fn test_value_list_keeps_empty_elements() {
    let values = ValueList::parse("^a^^b^");
    assert_eq!(values.as_slice(), ["", "a", "", "b", ""]);
}

#[test]
fn test_value_list_out_of_range() {
    let values = ValueList::parse("a^b");
    assert_eq!(
        values.at(2),
        Err(AccessError::OutOfRange { index: 2, len: 2 })
    );
    assert_eq!(values.get(2), None);
}

#[test]
fn test_value_list_reiteration_is_stable() {
    let values = ValueList::parse("x^y^z");
    let first: Vec<&str> = values.iter().collect();
    let second: Vec<&str> = values.iter().collect();
    assert_eq!(first, second);
    assert_eq!(first, vec!["x", "y", "z"]);

    let by_ref: Vec<&String> = (&values).into_iter().collect();
    assert_eq!(by_ref.len(), 3);
}

// ============================================================================
// Group Tests
// ============================================================================

#[test]
fn test_group_basic_pairs() {
    let group = Group::parse("Name^^Alice^^^Langs^^en^fr^^^Age^^ 42 ");
    assert_eq!(group.len(), 3);
    assert_eq!(group.tags().collect::<Vec<_>>(), vec!["name", "langs", "age"]);
    assert_eq!(group.value_for("age").unwrap().as_slice(), ["42"]);
    assert_eq!(group.value_for("langs").unwrap().as_slice(), ["en", "fr"]);
}

#[test]
fn test_group_lookup_is_case_insensitive_and_trimmed() {
    let group = Group::parse("Name^^Alice");
    let value = group.value_for("  NAME ").unwrap();
    assert_eq!(value, &ValueList::parse("Alice"));
    assert!(group.contains_tag("name"));
    assert!(group.contains_tag(" Name"));
    assert!(group.get("nAmE").is_some());
}

#[test]
fn test_group_stored_tags_are_normalized() {
    let group = Group::parse("  MiXeD Case  ^^v");
    assert_eq!(group.tags().next(), Some("mixed case"));
}

#[test]
fn test_group_duplicate_tag_first_wins() {
    let group = Group::parse("a^^1^^^a^^2");
    assert_eq!(group.len(), 1);
    assert_eq!(group.value_for("a").unwrap().at(0), Ok("1"));
}

#[test]
fn test_group_duplicate_tag_differs_only_by_case() {
    let group = Group::parse("Color^^red^^^COLOR^^blue^^^ color ^^green");
    assert_eq!(group.len(), 1);
    assert_eq!(group.value_for("color").unwrap().first(), Some("red"));
}

#[test]
fn test_group_malformed_pair_dropped() {
    let group = Group::parse("novaluemarkerhere^^^b^^2");
    assert_eq!(group.len(), 1);
    assert!(group.contains_tag("b"));
    assert!(!group.contains_tag("novaluemarkerhere"));
}

#[test]
fn test_group_empty_text_has_no_pairs() {
    let group = Group::parse("");
    assert!(group.is_empty());
    assert_eq!(group.iter().count(), 0);
}

#[test]
fn test_group_extra_tag_value_markers_ignored() {
    let group = Group::parse("a^^first^^second");
    assert_eq!(group.value_for("a").unwrap().as_slice(), ["first"]);
}

#[test]
fn test_group_empty_tag_and_value() {
    let group = Group::parse("^^^^^x^^");
    assert_eq!(group.len(), 1);
    assert_eq!(group.value_for("").unwrap().as_slice(), ["x"]);

    let group = Group::parse("t^^");
    assert_eq!(group.value_for("t").unwrap().as_slice(), [""]);
}

#[test]
fn test_group_unknown_tag() {
    let group = Group::parse("a^^1");
    assert!(matches!(
        group.value_for("doesnotexist"),
        Err(AccessError::KeyNotFound { .. })
    ));
    assert!(group.get("doesnotexist").is_none());
}

#[test]
fn test_group_contains_value_uses_sequence_equality() {
    let group = Group::parse("a^^x^y^^^b^^z");
    assert!(group.contains_value(&ValueList::parse(" x ^ y ")));
    assert!(group.contains_value(&["z"].into_iter().collect()));
    assert!(!group.contains_value(&ValueList::parse("y^x")));
    assert!(!group.contains_value(&ValueList::parse("x")));
}

#[test]
fn test_group_tags_and_values_are_aligned() {
    let group = Group::parse("c^^3^^^a^^1^^^b^^2");
    let tags: Vec<&str> = group.tags().collect();
    let values: Vec<&str> = group.values().filter_map(ValueList::first).collect();
    assert_eq!(tags, vec!["c", "a", "b"]);
    assert_eq!(values, vec!["3", "1", "2"]);

    for (pair, (tag, value)) in group.iter().zip(tags.iter().zip(group.values())) {
        assert_eq!(pair.tag(), *tag);
        assert_eq!(pair.value(), value);
    }
}

#[test]
fn test_group_reiteration_is_stable() {
    let group = Group::parse("x^^1^^^y^^2");
    let first: Vec<Pair> = group.iter().collect();
    let second: Vec<Pair> = (&group).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(group.iter().len(), 2);
    assert_eq!(group.iter().next_back().map(|p| p.tag()), Some("y"));
}

#[test]
fn test_group_pairs_bounded_by_segments() {
    let inputs = [
        "a^^1^^^b^^2^^^c^^3",
        "a^^1^^^a^^2^^^b",
        "^^^^^^",
        "x",
        "k^^v^^^^^^^k2^^v2",
    ];
    for input in inputs {
        let group = Group::parse(input);
        assert!(
            group.len() <= 1 + count_markers(input, PAIR_MARKER),
            "too many pairs for {:?}",
            input
        );
    }
    let clean = "a^^1^^^b^^2^^^c^^3";
    assert_eq!(Group::parse(clean).len(), 1 + count_markers(clean, PAIR_MARKER));
}

// ============================================================================
// Document Tests
// ============================================================================

#[test]
fn test_document_groups_in_order() {
    let doc = Document::parse("id^^1^^^^id^^2^^^^id^^3");
    assert_eq!(doc.len(), 3);
    let ids: Vec<&str> = doc
        .iter()
        .filter_map(|g| g.get("id").and_then(ValueList::first))
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_document_newline_insensitive() {
    let with_newline = Document::parse("a^^1\n^^^^b^^2");
    let without = Document::parse("a^^1^^^^b^^2");
    assert_eq!(with_newline, without);
}

#[test]
fn test_document_newlines_stripped_inside_values() {
    let doc = Document::parse("note^^first\r\nline^^^^^^^^");
    assert_eq!(
        doc.at(0).unwrap().value_for("note").unwrap().as_slice(),
        ["firstline"]
    );
    // eight trailing carets are two record markers
    assert_eq!(doc.len(), 3);
    assert!(doc.at(1).unwrap().is_empty());
    assert!(doc.at(2).unwrap().is_empty());
}

#[test]
fn test_document_markers_split_across_lines() {
    let doc = Document::parse("a^^1^^\n^^b^^2");
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.at(1).unwrap().value_for("b").unwrap().first(), Some("2"));
}

#[test]
fn test_document_empty_input() {
    let doc = Document::parse("");
    assert_eq!(doc.len(), 1);
    assert!(doc.at(0).unwrap().is_empty());
}

#[test]
fn test_document_group_count_property() {
    let inputs = [
        "",
        "a^^1",
        "a^^1^^^^b^^2",
        "a^^1\n^^^^\r\nb^^2^^^^",
        "^^^^^^^^^^^^",
        "^^^^^",
        "x^^^y^^^^z",
    ];
    for input in inputs {
        let doc = Document::parse(input);
        let cleaned = strip_line_breaks(input);
        assert_eq!(
            doc.len(),
            1 + count_markers(&cleaned, RECORD_MARKER),
            "wrong group count for {:?}",
            input
        );
    }
}

#[test]
fn test_document_out_of_range() {
    for input in ["", "a^^1", "a^^1^^^^b^^2"] {
        let doc = Document::parse(input);
        assert_eq!(
            doc.at(doc.len()),
            Err(AccessError::OutOfRange {
                index: doc.len(),
                len: doc.len()
            })
        );
    }
}

#[test]
fn test_document_reiteration_is_stable() {
    let doc = Document::parse("a^^1^^^^b^^2");
    let first: Vec<&Group> = doc.iter().collect();
    let second: Vec<&Group> = (&doc).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(doc.groups().len(), 2);
    assert_eq!(doc.pairs_count(), 2);

    let owned: Vec<Group> = doc.clone().into_iter().collect();
    assert_eq!(owned.as_slice(), doc.groups());
}

#[test]
fn test_document_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
    assert_send_sync::<Group>();
    assert_send_sync::<ValueList>();
}

// ============================================================================
// Diagnostics Tests
// ============================================================================

#[test]
fn test_recovery_matches_silent_parse() {
    let input = "a^^1^^^a^^2^^^junk^^^^b^^x^y\n^^^^";
    let mut parser = Parser::new();
    let result = parser.parse_with_recovery(input);
    assert_eq!(result.document, Document::parse(input));
    assert!(!result.is_ok());
}

#[test]
fn test_recovery_reports_drops_in_order() {
    let input = "a^^1^^^a^^2^^^junk^^^^b^^2";
    let mut parser = Parser::new();
    let result = parser.parse_with_recovery(input);

    let kinds: Vec<DiagnosticKind> = result.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::DuplicateTag, DiagnosticKind::MalformedPair]
    );

    let spans: Vec<Span> = result.diagnostics.iter().map(|d| d.span).collect();
    assert_eq!(spans, vec![Span::new(7, 11), Span::new(14, 18)]);
    assert_eq!(spans[1].slice(input), Some("junk"));
}

#[test]
fn test_recovery_spans_are_relative_to_stripped_input() {
    let input = "a^^1\n^^^^bad";
    let mut parser = Parser::new();
    let result = parser.parse_with_recovery(input);
    let diagnostic = result.diagnostics.first().unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::MalformedPair);
    assert_eq!(diagnostic.span, Span::new(8, 11));
    assert_eq!(
        diagnostic.span.slice(&strip_line_breaks(input)),
        Some("bad")
    );
}

#[test]
fn test_recovery_clean_input() {
    let mut parser = Parser::new();
    let result = parser.parse_with_recovery("a^^1^^^b^^2");
    assert!(result.is_ok());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_parser_is_reusable() {
    let mut parser = Parser::new();
    assert_eq!(parser.parse_with_recovery("junk").diagnostics.len(), 1);
    assert_eq!(parser.parse_with_recovery("a^^1").diagnostics.len(), 0);
}

#[test]
fn test_strict_parse_returns_first_drop() {
    let mut parser = Parser::new();
    let err = parser.parse("a^^1^^^A^^2^^^junk").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::DuplicateTag);
    assert_eq!(err.message, "duplicate tag \"a\" ignored");

    let doc = parser.parse("a^^1^^^b^^2").unwrap();
    assert_eq!(doc.at(0).unwrap().len(), 2);
}

#[test]
fn test_empty_record_is_a_malformed_pair() {
    let mut parser = Parser::new();
    let result = parser.parse_with_recovery("a^^1^^^^");
    assert_eq!(result.document.len(), 2);
    assert_eq!(
        result.diagnostics.count_of(DiagnosticKind::MalformedPair),
        1
    );
}
